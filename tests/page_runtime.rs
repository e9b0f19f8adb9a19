use page_binder::{Error, LocationNavigationKind, Page, Result, Visibility};

#[test]
fn malformed_markup_is_a_parse_error() {
    match Page::from_html(r#"<div class="comment><a>"#) {
        Err(Error::HtmlParse(message)) => {
            assert!(message.contains("unclosed"), "unexpected message: {message}");
        }
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn invalid_document_url_is_rejected() {
    match Page::from_html_with_url("not a url", "<p></p>") {
        Err(Error::Runtime(message)) => assert!(message.contains("invalid document url")),
        other => panic!("expected runtime error, got {other:?}"),
    }
}

#[test]
fn selector_errors_are_reported() -> Result<()> {
    let mut page = Page::from_html(r#"<button id="login_in">Sign in</button>"#)?;

    match page.click("#registration_in") {
        Err(Error::SelectorNotFound(selector)) => assert_eq!(selector, "#registration_in"),
        other => panic!("expected missing selector, got {other:?}"),
    }
    match page.click("button:first-child") {
        Err(Error::UnsupportedSelector(selector)) => assert_eq!(selector, "button:first-child"),
        other => panic!("expected unsupported selector, got {other:?}"),
    }
    assert!(page.exists("#login_in")?);
    assert!(!page.exists("#registration_in")?);
    Ok(())
}

#[test]
fn failed_style_assertion_carries_a_dom_snippet() -> Result<()> {
    let page = Page::from_html(r#"<div id="reply_form_1" style="display: none"></div>"#)?;

    let err = page
        .assert_inline_style("#reply_form_1", "display", "block")
        .expect_err("style differs");
    match err {
        Error::AssertionFailed {
            expected,
            actual,
            dom_snippet,
            ..
        } => {
            assert_eq!(expected, "block");
            assert_eq!(actual, "none");
            assert_eq!(
                dom_snippet,
                r#"<div id="reply_form_1" style="display: none"></div>"#
            );
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let err = page
        .assert_visibility("#reply_form_1", Visibility::Shown)
        .expect_err("form is hidden");
    assert!(err.to_string().contains("expected shown, actual hidden"));
    Ok(())
}

#[test]
fn plain_links_perform_full_navigations() -> Result<()> {
    let mut page = Page::from_html_with_url(
        "https://coffee.local/blog/7/",
        r##"<a id="menu" href="../../menu/">Menu</a><a id="top" href="#top">Top</a>"##,
    )?;

    page.click("#top")?;
    page.click("#menu")?;

    let navigations = page.take_location_navigations();
    assert_eq!(navigations.len(), 2);
    assert_eq!(navigations[0].kind, LocationNavigationKind::Fragment);
    assert_eq!(navigations[0].to, "https://coffee.local/blog/7/#top");
    assert_eq!(navigations[1].kind, LocationNavigationKind::HrefSet);
    assert_eq!(navigations[1].to, "https://coffee.local/menu/");
    Ok(())
}

#[test]
fn dispatching_other_events_runs_no_click_listeners() -> Result<()> {
    let mut page = Page::from_html(r#"<button id="login_in">Sign in</button>"#)?;
    page.install(page_binder::PageInteractionBinder::default());
    page.finish_parsing()?;

    page.dispatch("#login_in", "mouseover")?;
    assert!(page.take_location_navigations().is_empty());

    page.dispatch("#login_in", "click")?;
    assert_eq!(page.take_location_navigations().len(), 1);
    Ok(())
}

#[test]
fn clear_listeners_drops_pending_binders() -> Result<()> {
    let mut page = Page::from_html(r#"<button id="login_in">Sign in</button>"#)?;
    page.install(page_binder::PageInteractionBinder::default());
    page.clear_listeners();
    page.finish_parsing()?;

    assert!(page.bind_reports().is_empty());
    page.click("#login_in")?;
    assert!(page.take_location_navigations().is_empty());
    Ok(())
}

#[test]
fn trace_log_limit_keeps_latest_entries() -> Result<()> {
    let mut page = Page::from_html(r#"<button id="btn">run</button>"#)?;
    page.enable_trace(true);
    page.set_trace_stderr(false);
    page.set_trace_log_limit(2)?;

    page.dispatch("#btn", "alpha")?;
    page.dispatch("#btn", "beta")?;
    page.dispatch("#btn", "gamma")?;

    let logs = page.take_trace_logs();
    assert_eq!(logs.len(), 2);
    assert!(logs.iter().any(|line| line.contains("done beta")));
    assert!(logs.iter().any(|line| line.contains("done gamma")));
    assert!(logs.iter().all(|line| !line.contains("done alpha")));
    Ok(())
}

#[test]
fn trace_categories_can_disable_event_logs() -> Result<()> {
    let mut page = Page::from_html(r#"<button id="login_in">Sign in</button>"#)?;
    page.enable_trace(true);
    page.set_trace_stderr(false);
    page.set_trace_events(false);
    page.install(page_binder::PageInteractionBinder::default());
    page.finish_parsing()?;
    page.click("#login_in")?;

    let logs = page.take_trace_logs();
    assert!(logs.iter().all(|line| !line.starts_with("[event]")));
    assert!(logs.iter().any(|line| line.starts_with("[navigate]")));
    Ok(())
}

#[test]
fn trace_logs_are_empty_when_trace_is_disabled() -> Result<()> {
    let mut page = Page::from_html(r#"<button id="login_in">Sign in</button>"#)?;
    page.install(page_binder::PageInteractionBinder::default());
    page.finish_parsing()?;
    page.click("#login_in")?;
    assert!(page.take_trace_logs().is_empty());
    Ok(())
}

#[test]
fn set_trace_log_limit_rejects_zero() -> Result<()> {
    let mut page = Page::from_html(r#"<button id="btn">run</button>"#)?;
    match page.set_trace_log_limit(0) {
        Err(Error::Runtime(message)) => {
            assert!(message.contains("set_trace_log_limit requires at least 1 entry"));
        }
        other => panic!("unexpected result: {other:?}"),
    }
    Ok(())
}

#[test]
fn text_and_dump_reflect_the_parsed_markup() -> Result<()> {
    let page = Page::from_html(r#"<p id="note">Tom &amp; <b>Jerry</b></p>"#)?;
    assert_eq!(page.text("#note")?, "Tom & Jerry");
    assert_eq!(page.dump("#note")?, r#"<p id="note">Tom &amp; <b>Jerry</b></p>"#);
    Ok(())
}
