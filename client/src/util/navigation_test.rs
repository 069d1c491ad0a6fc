use super::*;

#[test]
fn strip_removes_only_stream_param() {
    let bar = AddressBar::parse("http://app.local/presentation?id=abc&stream=tok&tab=2#top").expect("url");
    assert_eq!(bar.stream_token().as_deref(), Some("tok"));

    bar.strip_stream_token();
    assert_eq!(bar.current().as_str(), "http://app.local/presentation?id=abc&tab=2#top");
    assert_eq!(bar.stream_token(), None);
}

#[test]
fn strip_drops_empty_query() {
    let bar = AddressBar::parse("http://app.local/presentation?stream=true").expect("url");
    bar.strip_stream_token();
    assert_eq!(bar.current().as_str(), "http://app.local/presentation");
}

#[test]
fn strip_without_token_is_noop() {
    let bar = AddressBar::parse("http://app.local/presentation?id=1").expect("url");
    bar.strip_stream_token();
    bar.strip_stream_token();
    assert_eq!(bar.current().as_str(), "http://app.local/presentation?id=1");
}

#[test]
fn without_query_param_removes_repeated_keys() {
    let url = Url::parse("http://h/p?stream=a&x=1&stream=b").expect("url");
    assert_eq!(without_query_param(&url, "stream").as_str(), "http://h/p?x=1");
}
