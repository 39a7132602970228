//! Property-based tests for compliance chains.

use compliance_core::prelude::*;
use proptest::prelude::*;

/// What a generated rule does when it runs.
#[derive(Debug, Clone)]
enum Action {
    Pass,
    Invalidate(String, String),
    Exit(String, String),
    Fault,
}

fn action() -> impl Strategy<Value = Action> {
    let key = prop::sample::select(vec!["a", "b", "c", "d"]).prop_map(str::to_string);
    let message = "[a-z]{1,8}";
    prop_oneof![
        3 => Just(Action::Pass),
        4 => (key.clone(), message).prop_map(|(k, m)| Action::Invalidate(k, m)),
        1 => (key, message).prop_map(|(k, m)| Action::Exit(k, m)),
        1 => Just(Action::Fault),
    ]
}

fn build(actions: &[Action]) -> Vec<SharedRule> {
    actions
        .iter()
        .cloned()
        .map(|action| {
            rule_fn("faults", "unused", move |scope| match &action {
                Action::Pass => Ok(()),
                Action::Invalidate(k, m) => {
                    scope.invalidate(Some(k.as_str()), Some(m.as_str()));
                    Ok(())
                }
                Action::Exit(k, m) => {
                    scope.invalidate_and_exit(Some(k.as_str()), Some(m.as_str()));
                    Ok(())
                }
                Action::Fault => Err(RuleFault::msg("generated fault")),
            })
        })
        .collect()
}

/// Messages the chain should record, computed without running it.
fn expected_messages(actions: &[Action]) -> usize {
    let mut count = 0;
    for action in actions {
        match action {
            Action::Pass => {}
            Action::Invalidate(..) | Action::Fault => count += 1,
            Action::Exit(..) => return count + 1,
        }
    }
    count
}

proptest! {
    #[test]
    fn valid_iff_no_errors(actions in prop::collection::vec(action(), 0..12)) {
        let result = ComplianceValidator::default().validate(&Payload::new(), &build(&actions));
        prop_assert_eq!(result.is_valid(), result.errors().is_empty());
        if result.is_valid() {
            prop_assert_eq!(result.message(), "");
            prop_assert_eq!(result.code(), None);
        } else {
            let first = result.errors().values().next().and_then(|m| m.first()).cloned();
            prop_assert_eq!(Some(result.message().to_string()), first);
            prop_assert_eq!(result.code(), Some(422));
        }
    }

    #[test]
    fn recorded_message_count_matches_model(actions in prop::collection::vec(action(), 0..12)) {
        let result = ComplianceValidator::default().validate(&Payload::new(), &build(&actions));
        let recorded: usize = result.errors().values().map(Vec::len).sum();
        prop_assert_eq!(recorded, expected_messages(&actions));
    }

    #[test]
    fn validation_is_idempotent(actions in prop::collection::vec(action(), 0..12)) {
        let validator = ComplianceValidator::default();
        let rules = build(&actions);
        let first = validator.validate(&Payload::new(), &rules);
        let second = validator.validate(&Payload::new(), &rules);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn empty_chain_is_always_valid(age in any::<i64>(), name in ".{0,16}") {
        let mut payload = Payload::new();
        payload.insert("age".into(), age.into());
        payload.insert("name".into(), name.into());
        let result = ComplianceValidator::default().validate(&payload, &[]);
        prop_assert!(result.is_valid());
    }
}
