use page_binder::{Page, PageInteractionBinder, ToggleError};
use proptest::collection::vec;
use proptest::prelude::*;
use proptest::test_runner::{TestCaseError, TestCaseResult};

const DEFAULT_BINDER_PROPTEST_CASES: u32 = 128;
const FORM_COUNT: usize = 3;

fn binder_proptest_cases() -> u32 {
    std::env::var("PAGE_BINDER_PROPTEST_CASES")
        .ok()
        .and_then(|raw| raw.parse::<u32>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_BINDER_PROPTEST_CASES)
}

/// Three well-formed reply pairs, one anchor without a form, one anchor with a
/// foreign href, and a login trigger.
fn comments_html(initially_shown: &[bool]) -> String {
    let mut html = String::from("<section id=\"comments\">");
    for (index, shown) in initially_shown.iter().enumerate() {
        let display = if *shown { "block" } else { "none" };
        html.push_str(&format!(
            "<article><a id=\"r{index}\" class=\"reply\" href=\"#reply_{index}\">Reply</a>\
             <div id=\"reply_form_{index}\" style=\"display: {display}\"></div></article>"
        ));
    }
    html.push_str(
        "<a id=\"orphan\" class=\"reply\" href=\"#reply_999\">Reply</a>\
         <a id=\"foreign\" class=\"reply\" href=\"/comments/1/\">Reply</a>\
         </section><button id=\"login_in\">Sign in</button>",
    );
    html
}

#[derive(Clone, Debug)]
enum UiAction {
    ClickReply(usize),
    ClickOrphan,
    ClickForeign,
    Rebind,
}

fn ui_action_strategy() -> BoxedStrategy<UiAction> {
    prop_oneof![
        6 => (0..FORM_COUNT).prop_map(UiAction::ClickReply),
        1 => Just(UiAction::ClickOrphan),
        1 => Just(UiAction::ClickForeign),
        1 => Just(UiAction::Rebind),
    ]
    .boxed()
}

fn fail<E: std::fmt::Debug>(err: E) -> TestCaseError {
    TestCaseError::fail(format!("{err:?}"))
}

fn assert_toggle_state_matches_click_parity(
    initially_shown: &[bool],
    actions: &[UiAction],
) -> TestCaseResult {
    let mut page = Page::from_html(&comments_html(initially_shown)).map_err(fail)?;
    page.install(PageInteractionBinder::default());
    page.finish_parsing().map_err(fail)?;

    let mut clicks = [0usize; FORM_COUNT];
    for (step, action) in actions.iter().enumerate() {
        match action {
            UiAction::ClickReply(index) => {
                page.click(&format!("#r{index}")).map_err(fail)?;
                clicks[*index] += 1;
            }
            UiAction::ClickOrphan => {
                page.click("#orphan").map_err(fail)?;
                let diagnostics = page.take_diagnostics();
                prop_assert_eq!(diagnostics.len(), 1, "step {}", step);
                prop_assert_eq!(
                    &diagnostics[0].error,
                    &ToggleError::MissingTarget {
                        form_id: "reply_form_999".to_string()
                    }
                );
            }
            UiAction::ClickForeign => {
                page.click("#foreign").map_err(fail)?;
                let diagnostics = page.take_diagnostics();
                prop_assert_eq!(diagnostics.len(), 1, "step {}", step);
            }
            UiAction::Rebind => {
                let reports = page.rebind();
                prop_assert_eq!(reports[0].listeners_added(), 0);
            }
        }
    }

    for (index, shown) in initially_shown.iter().enumerate() {
        let flipped = clicks[index] % 2 == 1;
        let expected = if *shown != flipped { "block" } else { "none" };
        let actual = page
            .inline_style(&format!("#reply_form_{index}"), "display")
            .map_err(fail)?;
        prop_assert_eq!(
            actual.as_deref(),
            Some(expected),
            "form {} after {} click(s), actions={:?}",
            index,
            clicks[index],
            actions
        );
        prop_assert_eq!(
            page.listener_count(&format!("#r{index}"), "click").map_err(fail)?,
            1
        );
    }

    page.click("#login_in").map_err(fail)?;
    prop_assert!(page.url().ends_with("/login/"));
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: binder_proptest_cases(),
        .. ProptestConfig::default()
    })]

    #[test]
    fn reply_forms_follow_click_parity(
        initially_shown in vec(any::<bool>(), FORM_COUNT),
        actions in vec(ui_action_strategy(), 0..=32),
    ) {
        assert_toggle_state_matches_click_parity(&initially_shown, &actions)?;
    }

    #[test]
    fn odd_clicks_show_and_even_clicks_hide(clicks in 0usize..12) {
        let mut page = Page::from_html(
            r##"<a class="reply" href="#reply_42">Reply</a><div id="reply_form_42" style="display: none"></div>"##,
        ).map_err(fail)?;
        page.install(PageInteractionBinder::default());
        page.finish_parsing().map_err(fail)?;

        for _ in 0..clicks {
            page.click(".reply").map_err(fail)?;
        }

        let expected = if clicks % 2 == 1 { "block" } else { "none" };
        let actual = page.inline_style("#reply_form_42", "display").map_err(fail)?;
        prop_assert_eq!(actual.as_deref(), Some(expected));
    }
}
