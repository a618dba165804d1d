use std::collections::BTreeMap;

use pdf_fields::*;

fn field(id: u64, name: &str, assigned_to: SignerRole) -> WorkflowField {
    WorkflowField {
        id,
        name: name.to_string(),
        field_type: FieldType::Text,
        assigned_to,
        value: None,
        rect: Rect::new(10.0, 10.0, 200.0, 20.0),
        page: 0,
        page_height: 792.0,
    }
}

fn workflow(status: WorkflowStatus, fields: Vec<WorkflowField>) -> Workflow {
    Workflow::new(WorkflowId(7), "contrat.pdf".to_string(), status, fields, Vec::new())
}

fn request(signer: SignerRole, values: &[(&str, &str)]) -> SignRequest {
    SignRequest {
        signer_role: signer,
        field_values: values
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<BTreeMap<_, _>>(),
    }
}

#[test]
fn test_linear_transitions() {
    use SignerRole::*;
    use WorkflowStatus::*;

    assert_eq!(next_status(Created, SigningEvent::Prepared), Ok(SignerAPending));
    assert_eq!(
        next_status(SignerAPending, SigningEvent::Submitted(SignerA)),
        Ok(SignerBPending)
    );
    assert_eq!(
        next_status(SignerBPending, SigningEvent::Submitted(SignerB)),
        Ok(Completed)
    );
}

#[test]
fn test_no_regression_or_skip() {
    use SignerRole::*;
    use WorkflowStatus::*;

    for (from, event) in [
        (SignerAPending, SigningEvent::Submitted(SignerB)),
        (SignerAPending, SigningEvent::Prepared),
        (SignerBPending, SigningEvent::Submitted(SignerA)),
        (Completed, SigningEvent::Submitted(SignerA)),
        (Completed, SigningEvent::Submitted(SignerB)),
        (Created, SigningEvent::Submitted(SignerA)),
    ] {
        assert_eq!(
            next_status(from, event),
            Err(FieldsError::InvalidTransition { from, event })
        );
    }
}

#[test]
fn test_only_a_submission_leaves_signer_a_pending() {
    let mut wf = workflow(
        WorkflowStatus::SignerAPending,
        vec![
            field(1, "Texte 1", SignerRole::SignerA),
            field(2, "Texte 2", SignerRole::SignerB),
        ],
    );

    let status = wf
        .apply_submission(
            &request(SignerRole::SignerA, &[("Texte 1", "Alice")]),
            EmptyStepPolicy::Require,
        )
        .unwrap();
    assert_eq!(status, WorkflowStatus::SignerBPending);
    assert_eq!(wf.fields()[0].value.as_deref(), Some("Alice"));
    assert_eq!(wf.fields()[1].value, None);
}

#[test]
fn test_out_of_turn_submission_is_rejected() {
    let mut wf = workflow(
        WorkflowStatus::SignerAPending,
        vec![field(1, "Texte 1", SignerRole::SignerB)],
    );
    let before = wf.clone();

    let result = wf.apply_submission(
        &request(SignerRole::SignerB, &[("Texte 1", "Bob")]),
        EmptyStepPolicy::Require,
    );
    assert_eq!(
        result,
        Err(FieldsError::NotSignersTurn {
            signer: SignerRole::SignerB,
            status: WorkflowStatus::SignerAPending,
        })
    );
    assert_eq!(wf, before);
}

#[test]
fn test_submission_cannot_touch_other_signers_fields() {
    let mut wf = workflow(
        WorkflowStatus::SignerAPending,
        vec![
            field(1, "Texte 1", SignerRole::SignerA),
            field(2, "Texte 2", SignerRole::SignerB),
        ],
    );
    let before = wf.clone();

    let result = wf.apply_submission(
        &request(SignerRole::SignerA, &[("Texte 1", "a"), ("Texte 2", "forged")]),
        EmptyStepPolicy::Require,
    );
    assert_eq!(result, Err(FieldsError::FieldNotOwned("Texte 2".to_string())));
    assert_eq!(wf, before);
}

#[test]
fn test_incomplete_submission_is_rejected() {
    let mut wf = workflow(
        WorkflowStatus::SignerAPending,
        vec![
            field(1, "Texte 1", SignerRole::SignerA),
            field(2, "Texte 2", SignerRole::SignerA),
        ],
    );

    let result = wf.apply_submission(
        &request(SignerRole::SignerA, &[("Texte 1", "a")]),
        EmptyStepPolicy::Require,
    );
    assert_eq!(
        result,
        Err(FieldsError::IncompleteSubmission(vec!["Texte 2".to_string()]))
    );
    assert_eq!(wf.status(), WorkflowStatus::SignerAPending);
}

#[test]
fn test_required_empty_step_waits_for_signer() {
    let assignments = [SignerRole::SignerB];
    assert_eq!(
        initial_status(&assignments, EmptyStepPolicy::Require),
        WorkflowStatus::SignerAPending
    );

    let mut wf = workflow(
        WorkflowStatus::SignerAPending,
        vec![field(1, "Texte 1", SignerRole::SignerB)],
    );
    let status = wf
        .apply_submission(&request(SignerRole::SignerA, &[]), EmptyStepPolicy::Require)
        .unwrap();
    assert_eq!(status, WorkflowStatus::SignerBPending);
}

#[test]
fn test_skip_policy_advances_empty_steps() {
    assert_eq!(
        initial_status(&[SignerRole::SignerB], EmptyStepPolicy::Skip),
        WorkflowStatus::SignerBPending
    );
    assert_eq!(
        initial_status(&[SignerRole::SignerA], EmptyStepPolicy::Skip),
        WorkflowStatus::SignerAPending
    );

    let mut wf = workflow(
        WorkflowStatus::SignerAPending,
        vec![field(1, "Texte 1", SignerRole::SignerA)],
    );
    let status = wf
        .apply_submission(
            &request(SignerRole::SignerA, &[("Texte 1", "x")]),
            EmptyStepPolicy::Skip,
        )
        .unwrap();
    assert_eq!(status, WorkflowStatus::Completed);
}

#[test]
fn test_step_states_and_actions() {
    let status = WorkflowStatus::SignerBPending;
    let states: Vec<StepState> = WorkflowStatus::STEPS
        .iter()
        .map(|step| status.step_state(*step))
        .collect();
    assert_eq!(
        states,
        vec![StepState::Done, StepState::Active, StepState::Pending]
    );

    assert_eq!(
        WorkflowStatus::SignerAPending.available_action(),
        Some(WorkflowAction::Sign(SignerRole::SignerA))
    );
    assert_eq!(
        WorkflowStatus::Completed.available_action(),
        Some(WorkflowAction::Download)
    );
    assert_eq!(WorkflowStatus::Created.available_action(), None);
}

#[test]
fn test_status_tokens() {
    for status in [
        WorkflowStatus::Created,
        WorkflowStatus::SignerAPending,
        WorkflowStatus::SignerBPending,
        WorkflowStatus::Completed,
    ] {
        assert_eq!(WorkflowStatus::from_token(status.token()), Some(status));
    }
    assert_eq!(WorkflowStatus::from_token("SIGNER_A_SIGNED"), None);
}
