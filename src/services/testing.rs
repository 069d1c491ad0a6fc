//! Scripted renderer shared by service and route tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::browser::{PageRenderer, RenderError};

/// Replays queued DOM results in order and hands out one PDF result.
/// Records every `dump_dom` call with its timeout.
pub struct ScriptedRenderer {
    doms: Mutex<VecDeque<Result<String, RenderError>>>,
    pdf: Mutex<Option<Result<Vec<u8>, RenderError>>>,
    dom_calls: Mutex<Vec<(String, Duration)>>,
}

impl ScriptedRenderer {
    pub fn new(doms: Vec<Result<String, RenderError>>, pdf: Result<Vec<u8>, RenderError>) -> Self {
        Self { doms: Mutex::new(doms.into()), pdf: Mutex::new(Some(pdf)), dom_calls: Mutex::new(Vec::new()) }
    }

    pub fn dom(html: &str) -> Self {
        Self::new(vec![Ok(html.to_owned())], Ok(Vec::new()))
    }

    pub fn dom_calls(&self) -> Vec<(String, Duration)> {
        self.dom_calls.lock().expect("calls lock").clone()
    }
}

fn exhausted(what: &str) -> RenderError {
    RenderError::Failed { status: "scripted".into(), stderr: format!("no {what} left") }
}

#[async_trait]
impl PageRenderer for ScriptedRenderer {
    async fn dump_dom(&self, url: &str, timeout: Duration) -> Result<String, RenderError> {
        self.dom_calls.lock().expect("calls lock").push((url.to_owned(), timeout));
        self.doms.lock().expect("doms lock").pop_front().unwrap_or_else(|| Err(exhausted("dom")))
    }

    async fn print_pdf(&self, _url: &str, _timeout: Duration) -> Result<Vec<u8>, RenderError> {
        self.pdf.lock().expect("pdf lock").take().unwrap_or_else(|| Err(exhausted("pdf")))
    }
}
