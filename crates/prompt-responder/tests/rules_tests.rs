//! Integration tests for rule tables built with the `rules!` macro.

use std::sync::Arc;

use prompt_responder::{Answers, Detection, Responder, Response, RuleTable, rules};

#[test]
fn macro_preserves_declaration_order() {
    let table = rules! {
        r"\? Enter the model name:( \(.*\))?$" => enter("modelName"),
        r"\? .* \(Use arrow keys\)" => select_default,
        r"(?i)\? .* \(y/n\)$" => accept_default,
        r"\? Path uri:$" => answer("pathUri"),
    };

    let responses: Vec<&Response> = table.iter().map(|rule| rule.response()).collect();
    assert_eq!(
        responses,
        vec![
            &Response::named("modelName"),
            &Response::AcceptDefault,
            &Response::AcceptDefault,
            &Response::named("pathUri"),
        ]
    );
}

#[test]
fn swapping_rules_changes_the_outcome() {
    let prompt = "? Enter the model name: (Use arrow keys)";

    let specific_first = rules! {
        r"\? Enter the model name:( \(.*\))?$" => enter("modelName"),
        r"\? .* \(Use arrow keys\)" => select_default,
    };
    let catch_all_first = rules! {
        r"\? .* \(Use arrow keys\)" => select_default,
        r"\? Enter the model name:( \(.*\))?$" => enter("modelName"),
    };

    let (index, rule) = specific_first.classify(prompt).unwrap();
    assert_eq!((index, rule.response()), (0, &Response::named("modelName")));

    let (index, rule) = catch_all_first.classify(prompt).unwrap();
    assert_eq!((index, rule.response()), (0, &Response::AcceptDefault));
}

#[tokio::test]
async fn custom_table_drives_a_responder() {
    let table = rules! {
        r"^Project name\?$" => enter("projectName"),
        r"^Continue\? \[Y/n\]$" => select_default,
    };
    let answers = Answers::new().with("projectName", "demo");
    let mut responder = Responder::new(Vec::new(), answers, Arc::new(table));

    let first = responder
        .detect_prompt_and_respond("Project name? ")
        .await
        .unwrap();
    let second = responder
        .detect_prompt_and_respond("\x1b[1A\x1b[2Kold line\nContinue? [Y/n] ")
        .await
        .unwrap();
    let third = responder
        .detect_prompt_and_respond("? What's the name of your application? (x)")
        .await
        .unwrap();

    assert!(first.is_responded());
    assert!(second.is_responded());
    assert!(matches!(third, Detection::Ignored { .. }));

    let (input, transcript) = responder.into_parts();
    assert_eq!(input, b"demo\n\n");
    assert!(transcript.render().contains("DISCARDED ^<ESC>[1A<ESC>[2Kold line$"));
}

#[test]
fn scaffold_can_be_extended_for_other_generators() {
    let mut table = rules! {
        r"\? Enter the controller name:$" => enter("controllerName"),
    };
    table.extend(RuleTable::scaffold());

    assert_eq!(table.len(), 25);
    let (index, _) = table.classify("? Enter the controller name:").unwrap();
    assert_eq!(index, 0);
    let (index, rule) = table.classify("? Path uri:").unwrap();
    assert_eq!(index, 21);
    assert_eq!(rule.response(), &Response::AcceptDefault);
}
