use passportify_cms::{
    guard::{GuardDecision, evaluate, evaluate_super_admin},
    models::Role,
    session::{AuthPhase, AuthSnapshot},
    supabase::AuthIdentity,
};
use uuid::Uuid;

/// Builds a snapshot for a phase; a user is attached for every phase past anonymous.
fn snapshot(phase: AuthPhase, role: Option<Role>) -> AuthSnapshot {
    let mut snap = AuthSnapshot::default();
    snap.phase = phase;
    if phase != AuthPhase::Anonymous {
        snap.user = Some(AuthIdentity {
            id: Uuid::new_v4(),
            email: "someone@passportify.test".to_string(),
        });
    }
    snap.role = role;
    snap
}

#[test]
fn test_admin_guard_decision_table() {
    let cases = [
        (AuthPhase::Anonymous, None, GuardDecision::RedirectToSignIn),
        (AuthPhase::Authenticating, None, GuardDecision::Loading),
        (AuthPhase::RoleUnknown, None, GuardDecision::Loading),
        (AuthPhase::RoleKnown, Some(Role::User), GuardDecision::AccessDenied),
        (
            AuthPhase::RoleKnown,
            Some(Role::Other("editor".to_string())),
            GuardDecision::AccessDenied,
        ),
        (AuthPhase::RoleKnown, Some(Role::Admin), GuardDecision::Allow),
        (AuthPhase::RoleKnown, Some(Role::SuperAdmin), GuardDecision::Allow),
    ];

    for (phase, role, expected) in cases {
        let snap = snapshot(phase, role.clone());
        assert_eq!(
            evaluate(&snap, true),
            expected,
            "phase {phase:?} with role {role:?}"
        );
    }
}

#[test]
fn test_signed_in_gate_without_admin_requirement() {
    assert_eq!(
        evaluate(&snapshot(AuthPhase::RoleKnown, Some(Role::User)), false),
        GuardDecision::Allow
    );
    assert_eq!(
        evaluate(&snapshot(AuthPhase::Anonymous, None), false),
        GuardDecision::RedirectToSignIn
    );
}

#[test]
fn test_unresolved_admin_is_never_redirected() {
    // An admin whose role has not arrived yet must see the placeholder, not a redirect.
    let snap = snapshot(AuthPhase::RoleUnknown, None);
    let decision = evaluate(&snap, true);

    assert_eq!(decision, GuardDecision::Loading);
    assert_ne!(decision, GuardDecision::RedirectToSignIn);
    assert_ne!(decision, GuardDecision::AccessDenied);
}

#[test]
fn test_authenticating_with_known_role_is_still_loading() {
    // A sign-in attempt is in flight on top of an existing admin session.
    let snap = snapshot(AuthPhase::Authenticating, Some(Role::Admin));

    assert_eq!(evaluate(&snap, true), GuardDecision::Loading);
}

#[test]
fn test_super_admin_guard() {
    assert_eq!(
        evaluate_super_admin(&snapshot(AuthPhase::RoleKnown, Some(Role::SuperAdmin))),
        GuardDecision::Allow
    );
    assert_eq!(
        evaluate_super_admin(&snapshot(AuthPhase::RoleKnown, Some(Role::Admin))),
        GuardDecision::AccessDenied
    );
    assert_eq!(
        evaluate_super_admin(&snapshot(AuthPhase::RoleUnknown, None)),
        GuardDecision::Loading
    );
    assert_eq!(
        evaluate_super_admin(&snapshot(AuthPhase::Anonymous, None)),
        GuardDecision::RedirectToSignIn
    );
}
