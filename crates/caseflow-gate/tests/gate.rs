use async_trait::async_trait;
use caseflow_authz::{Actor, FieldPath, Policy, QueryFilter, ReasonCode, Restriction};
use caseflow_gate::{
    GateError, InMemoryResolver, Operation, RequestGate, ResolveError, ResourceResolver, Scope,
};
use caseflow_test_utils::{assert_err, assert_ok, feedback_rows};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn feedback_resolver() -> InMemoryResolver {
    InMemoryResolver::from_rows(feedback_rows(), &FieldPath::parse("id").unwrap())
}

fn gate() -> RequestGate {
    RequestGate::builder(Arc::new(Policy::builtin().unwrap()))
        .resolver("feedback", feedback_resolver())
        .build()
        .unwrap()
}

/// Never answers within any sane timeout.
struct StalledResolver;

#[async_trait]
impl ResourceResolver for StalledResolver {
    async fn resolve(&self, _id: &str) -> Result<Value, ResolveError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(json!({"id": 1, "createdBy": 1}))
    }
}

/// Fails every lookup and counts calls.
#[derive(Default)]
struct BrokenResolver {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl ResourceResolver for BrokenResolver {
    async fn resolve(&self, _id: &str) -> Result<Value, ResolveError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(ResolveError::Backend("connection reset".to_string()))
    }
}

#[tokio::test]
async fn missing_actor_is_unauthenticated() {
    let gate = gate();
    for op in [
        Operation::create("feedback"),
        Operation::instance("feedback", "read", 10),
        Operation::list("feedback", "read"),
    ] {
        let err = assert_err!(gate.check(None, &op).await);
        assert!(matches!(err, GateError::Unauthenticated));
    }
}

#[tokio::test]
async fn owner_reads_own_feedback() {
    let gate = gate();
    let owner = Actor::new(1, "user");

    let grant = assert_ok!(
        gate.check(Some(&owner), &Operation::instance("feedback", "read", 10))
            .await
    );
    assert!(grant.decision.allowed);
    assert_eq!(grant.decision.restriction, Restriction::Own);
    assert_eq!(grant.target.unwrap()["id"], 10);
    assert!(grant.filter.is_none());
}

#[tokio::test]
async fn string_owner_id_matches_numeric_actor() {
    let gate = gate();
    // Row 12 stores its owner as the string "2".
    let owner = Actor::new(2, "user");
    assert_ok!(
        gate.check(Some(&owner), &Operation::instance("feedback", "update", 12))
            .await
    );
}

#[tokio::test]
async fn non_owner_keeps_engine_code() {
    let gate = gate();
    let stranger = Actor::new(9, "user");

    let err = assert_err!(
        gate.check(Some(&stranger), &Operation::instance("feedback", "read", 10))
            .await
    );
    assert_eq!(err.reason(), Some(ReasonCode::ForbiddenNotOwner));
    assert_eq!(err.error_code(), "FORBIDDEN_NOT_OWNER");

    let staff = Actor::new(9, "staff");
    let err = assert_err!(
        gate.check(Some(&staff), &Operation::instance("feedback", "update", 10))
            .await
    );
    assert_eq!(err.reason(), Some(ReasonCode::ForbiddenNotAssigned));
}

#[tokio::test]
async fn missing_instance_is_not_found() {
    let gate = gate();
    // An admin would be allowed on any instance; the lookup still decides.
    let admin = Actor::new(1, "admin");

    let err = assert_err!(
        gate.check(Some(&admin), &Operation::instance("feedback", "delete", 999))
            .await
    );
    match err {
        GateError::ResourceNotFound { resource, id } => {
            assert_eq!(resource.as_str(), "feedback");
            assert_eq!(id.as_deref(), Some("999"));
        }
        other => panic!("Expected ResourceNotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn required_instance_without_id_is_not_found() {
    let gate = gate();
    let op = Operation::new(
        "feedback",
        "read",
        Scope::Instance {
            id: None,
            required: true,
        },
    );

    let err = assert_err!(gate.check(Some(&Actor::new(1, "admin")), &op).await);
    assert_eq!(err.to_string(), "feedback not found: no id given");
    match err {
        GateError::ResourceNotFound { id, .. } => assert!(id.is_none()),
        other => panic!("Expected ResourceNotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn resolver_timeout_fails_closed() {
    let gate = RequestGate::builder(Arc::new(Policy::builtin().unwrap()))
        .resolver("feedback", StalledResolver)
        .resolver_timeout(Duration::from_millis(20))
        .build()
        .unwrap();
    let admin = Actor::new(1, "admin");

    let err = assert_err!(
        gate.check(Some(&admin), &Operation::instance("feedback", "read", 1))
            .await
    );
    assert!(matches!(err, GateError::ResourceNotFound { .. }));
}

#[tokio::test]
async fn resolver_error_fails_closed() {
    let calls = Arc::new(AtomicUsize::new(0));
    let gate = RequestGate::builder(Arc::new(Policy::builtin().unwrap()))
        .resolver(
            "feedback",
            BrokenResolver {
                calls: Arc::clone(&calls),
            },
        )
        .build()
        .unwrap();
    let admin = Actor::new(1, "admin");

    let err = assert_err!(
        gate.check(Some(&admin), &Operation::instance("feedback", "read", 1))
            .await
    );
    assert!(matches!(err, GateError::ResourceNotFound { .. }));
    // The gate never retries on the resolver's behalf.
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn optional_target_falls_back_to_no_target() {
    let gate = gate();

    // ALL needs no target, so an unresolvable optional instance passes.
    let manager = Actor::new(1, "manager");
    let grant = assert_ok!(
        gate.check(
            Some(&manager),
            &Operation::optional_instance("feedback", "read", Some("999".to_string())),
        )
        .await
    );
    assert!(grant.target.is_none());

    // OWN without a target can never be satisfied.
    let user = Actor::new(1, "user");
    let err = assert_err!(
        gate.check(
            Some(&user),
            &Operation::optional_instance("feedback", "read", None),
        )
        .await
    );
    assert_eq!(err.reason(), Some(ReasonCode::TargetRequired));
}

#[tokio::test]
async fn list_attaches_filter() {
    let gate = gate();

    let user = Actor::new(1, "user");
    let grant = assert_ok!(
        gate.check(Some(&user), &Operation::list("feedback", "read"))
            .await
    );
    let filter = grant.filter.unwrap();
    assert_eq!(filter.to_string(), "createdBy = 1");
    let visible: Vec<_> = feedback_rows()
        .into_iter()
        .filter(|row| filter.matches(row))
        .map(|row| row["id"].clone())
        .collect();
    assert_eq!(visible, vec![json!(10), json!(11)]);

    let staff = Actor::new(2, "staff");
    let grant = assert_ok!(
        gate.check(Some(&staff), &Operation::list("feedback", "read"))
            .await
    );
    assert_eq!(grant.filter.unwrap().to_string(), "assignedTo = 2");

    let admin = Actor::new(1, "admin");
    let grant = assert_ok!(
        gate.check(Some(&admin), &Operation::list("feedback", "read"))
            .await
    );
    assert_eq!(grant.filter, Some(QueryFilter::Any));
}

#[tokio::test]
async fn list_without_permission_is_forbidden() {
    let gate = gate();
    let user = Actor::new(1, "user");

    let err = assert_err!(
        gate.check(Some(&user), &Operation::list("system", "read"))
            .await
    );
    assert_eq!(err.reason(), Some(ReasonCode::ForbiddenNoPermission));
}

#[tokio::test]
async fn undeclared_role_has_no_permissions() {
    let gate = gate();
    let ghost = Actor::new(1, "guest");

    let err = assert_err!(
        gate.check(Some(&ghost), &Operation::create("feedback"))
            .await
    );
    assert!(matches!(
        err,
        GateError::Forbidden {
            code: ReasonCode::ForbiddenNoPermission
        }
    ));
}

#[tokio::test]
async fn concurrent_checks_agree() {
    let gate = Arc::new(gate());
    let mut handles = Vec::new();
    for _ in 0..16 {
        let gate = Arc::clone(&gate);
        handles.push(tokio::spawn(async move {
            let actor = Actor::new(2, "staff");
            gate.check(Some(&actor), &Operation::instance("feedback", "update", 13))
                .await
                .map(|grant| grant.decision)
                .map_err(|err| err.error_code())
        }));
    }

    let mut outcomes = Vec::new();
    for handle in handles {
        outcomes.push(handle.await.unwrap());
    }
    assert!(outcomes.iter().all(|o| o == &outcomes[0]));
    assert!(outcomes[0].is_ok());
}
