use pdf_fields::*;

fn field(id: u64, name: &str, field_type: FieldType, assigned_to: SignerRole) -> WorkflowField {
    WorkflowField {
        id,
        name: name.to_string(),
        field_type,
        assigned_to,
        value: None,
        rect: Rect::new(0.0, 0.0, 15.0, 15.0),
        page: (id % 2) as usize,
        page_height: 792.0,
    }
}

fn sample_workflow(status: WorkflowStatus) -> Workflow {
    let mut b_field = field(2, "Texte 2", FieldType::Text, SignerRole::SignerB);
    b_field.value = Some("deja rempli".to_string());
    let mut a_field = field(1, "Texte 1", FieldType::Text, SignerRole::SignerA);
    a_field.value = Some("brouillon".to_string());
    Workflow::new(
        WorkflowId(1),
        "doc.pdf".to_string(),
        status,
        vec![
            a_field,
            b_field,
            field(3, "Case a cocher 1", FieldType::Checkbox, SignerRole::SignerA),
        ],
        Vec::new(),
    )
}

#[test]
fn test_session_seeds_owned_values() {
    let wf = sample_workflow(WorkflowStatus::SignerAPending);
    let session = SignerSession::open(&wf, SignerRole::SignerA).unwrap();

    let request = session.submit();
    assert_eq!(request.signer_role, SignerRole::SignerA);
    assert_eq!(request.field_values.len(), 2);
    assert_eq!(request.field_values["Texte 1"], "brouillon");
    assert_eq!(request.field_values["Case a cocher 1"], "false");
}

#[test]
fn test_untouched_checkbox_is_submitted_as_false() {
    let mut wf = sample_workflow(WorkflowStatus::SignerAPending);
    let session = SignerSession::open(&wf, SignerRole::SignerA).unwrap();

    wf.apply_submission(&session.submit(), EmptyStepPolicy::Require)
        .unwrap();

    let stored = wf
        .fields()
        .iter()
        .find(|f| f.name == "Case a cocher 1")
        .unwrap();
    assert_eq!(stored.value.as_deref(), Some("false"));
    let reopened = SignerSession::open(&wf, SignerRole::SignerB).unwrap();
    assert!(!reopened.is_checked(stored));
}

#[test]
fn test_session_exposes_all_fields_but_edits_only_owned() {
    let wf = sample_workflow(WorkflowStatus::SignerAPending);
    let mut session = SignerSession::open(&wf, SignerRole::SignerA).unwrap();
    assert_eq!(session.fields().len(), 3);

    assert_eq!(
        session.set_value("Texte 2", "pirate"),
        Err(FieldsError::FieldNotOwned("Texte 2".to_string()))
    );
    assert_eq!(
        session.set_value("Nope", "x"),
        Err(FieldsError::UnknownField("Nope".to_string()))
    );

    let other = &session.fields()[1];
    assert!(!session.is_editable(other));
    assert_eq!(session.display_value(other), Some("deja rempli"));
}

#[test]
fn test_submission_never_alters_other_signers_fields() {
    let mut wf = sample_workflow(WorkflowStatus::SignerAPending);
    let mut session = SignerSession::open(&wf, SignerRole::SignerA).unwrap();
    session.set_value("Texte 1", "Alice").unwrap();
    session.set_checked("Case a cocher 1", true).unwrap();

    wf.apply_submission(&session.submit(), EmptyStepPolicy::Require)
        .unwrap();

    let b = wf.fields().iter().find(|f| f.name == "Texte 2").unwrap();
    assert_eq!(b.value.as_deref(), Some("deja rempli"));
    let a = wf.fields().iter().find(|f| f.name == "Texte 1").unwrap();
    assert_eq!(a.value.as_deref(), Some("Alice"));
    assert_eq!(wf.status(), WorkflowStatus::SignerBPending);
}

#[test]
fn test_toggle_values() {
    let wf = sample_workflow(WorkflowStatus::SignerAPending);
    let mut session = SignerSession::open(&wf, SignerRole::SignerA).unwrap();
    let checkbox = session.fields()[2].clone();

    assert!(!session.is_checked(&checkbox));
    session.set_checked("Case a cocher 1", true).unwrap();
    assert!(session.is_checked(&checkbox));
    session.set_checked("Case a cocher 1", false).unwrap();
    assert_eq!(session.display_value(&checkbox), Some("false"));
}

#[test]
fn test_session_only_opens_on_signers_turn() {
    let wf = sample_workflow(WorkflowStatus::SignerAPending);
    let err = SignerSession::open(&wf, SignerRole::SignerB).unwrap_err();
    assert_eq!(
        err,
        FieldsError::NotSignersTurn {
            signer: SignerRole::SignerB,
            status: WorkflowStatus::SignerAPending,
        }
    );

    let done = sample_workflow(WorkflowStatus::Completed);
    assert!(SignerSession::open(&done, SignerRole::SignerA).is_err());
    assert!(SignerSession::open(&done, SignerRole::SignerB).is_err());
}

#[test]
fn test_fields_on_page() {
    let wf = sample_workflow(WorkflowStatus::SignerBPending);
    let session = SignerSession::open(&wf, SignerRole::SignerB).unwrap();
    let names: Vec<&str> = session.fields_on_page(1).map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["Texte 1", "Case a cocher 1"]);
}
