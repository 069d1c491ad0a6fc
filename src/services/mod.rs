//! Domain services behind the HTTP routes.
//!
//! SYSTEM CONTEXT
//! ==============
//! `export` prints a presentation to PDF and stores it under the app data
//! directory; `template` reads the layout manifest a schema page embeds in
//! its DOM. Both render pages through [`crate::browser::PageRenderer`] and
//! inspect the result with `dom`.

pub mod dom;
pub mod export;
pub mod template;

#[cfg(test)]
pub mod testing;
