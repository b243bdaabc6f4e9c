//! Lease lifecycle scenarios driven through the public service facade and HTTP router.

mod common {
    use std::collections::BTreeMap;
    use std::sync::{Arc, Mutex};

    use chrono::NaiveDate;
    use tenant_billing::workflows::lease::{
        LeaseAgreement, LeaseId, LeaseRepository, LeaseService, LeaseStatus, NewLease,
        RepositoryError,
    };

    pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    pub(super) fn terms(unit_id: &str, end_date: NaiveDate) -> NewLease {
        NewLease {
            tenant_id: format!("tenant-{unit_id}"),
            unit_id: unit_id.to_string(),
            start_date: date(2024, 7, 1),
            end_date,
        }
    }

    #[derive(Default, Clone)]
    pub(super) struct MemoryRepository {
        leases: Arc<Mutex<BTreeMap<LeaseId, LeaseAgreement>>>,
    }

    impl LeaseRepository for MemoryRepository {
        fn insert(&self, lease: LeaseAgreement) -> Result<LeaseAgreement, RepositoryError> {
            let mut guard = self.leases.lock().expect("lock");
            if guard.contains_key(&lease.id) {
                return Err(RepositoryError::Conflict);
            }
            guard.insert(lease.id.clone(), lease.clone());
            Ok(lease)
        }

        fn fetch(&self, id: &LeaseId) -> Result<Option<LeaseAgreement>, RepositoryError> {
            Ok(self.leases.lock().expect("lock").get(id).cloned())
        }

        fn update_if_current(
            &self,
            lease: &LeaseAgreement,
            expected: LeaseStatus,
            revision: u64,
        ) -> Result<bool, RepositoryError> {
            let mut guard = self.leases.lock().expect("lock");
            match guard.get(&lease.id) {
                Some(stored) if stored.status() == expected && stored.revision() == revision => {
                    guard.insert(lease.id.clone(), lease.clone());
                    Ok(true)
                }
                Some(_) => Ok(false),
                None => Err(RepositoryError::NotFound),
            }
        }

        fn active_ending_before(
            &self,
            date: NaiveDate,
        ) -> Result<Vec<LeaseAgreement>, RepositoryError> {
            Ok(self
                .leases
                .lock()
                .expect("lock")
                .values()
                .filter(|lease| lease.status() == LeaseStatus::Active && lease.end_date < date)
                .cloned()
                .collect())
        }
    }

    /// Loses every conditional write, as if another writer always got there first.
    #[derive(Default)]
    pub(super) struct RacingRepository {
        inner: MemoryRepository,
    }

    impl LeaseRepository for RacingRepository {
        fn insert(&self, lease: LeaseAgreement) -> Result<LeaseAgreement, RepositoryError> {
            self.inner.insert(lease)
        }

        fn fetch(&self, id: &LeaseId) -> Result<Option<LeaseAgreement>, RepositoryError> {
            self.inner.fetch(id)
        }

        fn update_if_current(
            &self,
            _lease: &LeaseAgreement,
            _expected: LeaseStatus,
            _revision: u64,
        ) -> Result<bool, RepositoryError> {
            Ok(false)
        }

        fn active_ending_before(
            &self,
            date: NaiveDate,
        ) -> Result<Vec<LeaseAgreement>, RepositoryError> {
            self.inner.active_ending_before(date)
        }
    }

    /// Serves reads from a snapshot frozen before the writes land, so every caller acts on
    /// the same stale copy.
    #[derive(Default)]
    pub(super) struct StaleReadRepository {
        inner: MemoryRepository,
        snapshot: Mutex<Option<LeaseAgreement>>,
    }

    impl StaleReadRepository {
        pub(super) fn freeze(&self, id: &LeaseId) {
            let current = self.inner.fetch(id).expect("fetch");
            *self.snapshot.lock().expect("lock") = current;
        }

        pub(super) fn stored(&self, id: &LeaseId) -> Option<LeaseAgreement> {
            self.inner.fetch(id).expect("fetch")
        }
    }

    impl LeaseRepository for StaleReadRepository {
        fn insert(&self, lease: LeaseAgreement) -> Result<LeaseAgreement, RepositoryError> {
            self.inner.insert(lease)
        }

        fn fetch(&self, id: &LeaseId) -> Result<Option<LeaseAgreement>, RepositoryError> {
            match self.snapshot.lock().expect("lock").as_ref() {
                Some(frozen) if &frozen.id == id => Ok(Some(frozen.clone())),
                _ => self.inner.fetch(id),
            }
        }

        fn update_if_current(
            &self,
            lease: &LeaseAgreement,
            expected: LeaseStatus,
            revision: u64,
        ) -> Result<bool, RepositoryError> {
            self.inner.update_if_current(lease, expected, revision)
        }

        fn active_ending_before(
            &self,
            date: NaiveDate,
        ) -> Result<Vec<LeaseAgreement>, RepositoryError> {
            self.inner.active_ending_before(date)
        }
    }

    pub(super) fn build_service() -> (LeaseService<MemoryRepository>, Arc<MemoryRepository>) {
        let repository = Arc::new(MemoryRepository::default());
        (LeaseService::new(repository.clone()), repository)
    }
}

mod service {
    use super::common::*;
    use std::sync::Arc;
    use tenant_billing::workflows::lease::{
        LeaseId, LeaseService, LeaseServiceError, LeaseStatus, LeaseTransitionError,
        RepositoryError, SigningParty,
    };

    #[test]
    fn lease_activates_after_both_signatures() {
        let (service, _) = build_service();
        let lease = service
            .create(terms("A-201", date(2025, 6, 30)))
            .expect("lease created");
        assert_eq!(lease.status(), LeaseStatus::Pending);

        let lease = service
            .sign(&lease.id, SigningParty::Landlord, date(2024, 6, 20))
            .expect("landlord signs");
        assert_eq!(lease.status(), LeaseStatus::Pending);

        let lease = service
            .sign(&lease.id, SigningParty::Tenant, date(2024, 6, 21))
            .expect("tenant signs");
        assert_eq!(lease.status(), LeaseStatus::Active);
        assert_eq!(
            service.get(&lease.id).expect("stored").status(),
            LeaseStatus::Active
        );
    }

    #[test]
    fn create_rejects_inverted_terms() {
        let (service, _) = build_service();
        let mut bad_terms = terms("A-201", date(2024, 6, 1));
        bad_terms.start_date = date(2024, 7, 1);
        assert!(matches!(
            service.create(bad_terms),
            Err(LeaseServiceError::InvalidTerm { .. })
        ));
    }

    #[test]
    fn cancelled_lease_is_never_reactivated() {
        let (service, _) = build_service();
        let lease = service
            .create(terms("A-202", date(2025, 6, 30)))
            .expect("lease created");
        service.cancel(&lease.id).expect("pending lease cancels");

        match service.sign(&lease.id, SigningParty::Tenant, date(2024, 6, 21)) {
            Err(LeaseServiceError::Transition(LeaseTransitionError::Illegal { from, .. })) => {
                assert_eq!(from, LeaseStatus::Cancelled)
            }
            other => panic!("expected illegal transition, got {other:?}"),
        }
    }

    #[test]
    fn stale_write_is_reported_as_conflict() {
        let repository = Arc::new(RacingRepository::default());
        let service = LeaseService::new(repository.clone());
        let lease = service
            .create(terms("A-203", date(2025, 6, 30)))
            .expect("lease created");

        match service.cancel(&lease.id) {
            Err(LeaseServiceError::Repository(RepositoryError::Conflict)) => {}
            other => panic!("expected conflict, got {other:?}"),
        }
        assert_eq!(
            service.get(&lease.id).expect("stored").status(),
            LeaseStatus::Pending
        );
    }

    #[test]
    fn concurrent_signatures_do_not_overwrite_each_other() {
        let repository = Arc::new(StaleReadRepository::default());
        let service = LeaseService::new(repository.clone());
        let lease = service
            .create(terms("A-204", date(2025, 6, 30)))
            .expect("lease created");
        repository.freeze(&lease.id);

        service
            .sign(&lease.id, SigningParty::Landlord, date(2024, 6, 20))
            .expect("first signature lands");
        match service.sign(&lease.id, SigningParty::Tenant, date(2024, 6, 21)) {
            Err(LeaseServiceError::Repository(RepositoryError::Conflict)) => {}
            other => panic!("expected conflict, got {other:?}"),
        }

        let stored = repository.stored(&lease.id).expect("lease stored");
        assert_eq!(
            stored.signed_on(SigningParty::Landlord),
            Some(date(2024, 6, 20))
        );
        assert_eq!(stored.signed_on(SigningParty::Tenant), None);
        assert_eq!(stored.revision(), 1);
    }

    #[test]
    fn unknown_lease_is_not_found() {
        let (service, _) = build_service();
        match service.cancel(&LeaseId("lease-missing".to_string())) {
            Err(LeaseServiceError::Repository(RepositoryError::NotFound)) => {}
            other => panic!("expected not found, got {other:?}"),
        }
    }
}

mod sweep {
    use super::common::*;
    use chrono::NaiveDate;
    use tenant_billing::workflows::lease::{LeaseService, LeaseStatus, SigningParty};

    fn activate(service: &LeaseService<MemoryRepository>, unit_id: &str, end: NaiveDate) {
        let lease = service.create(terms(unit_id, end)).expect("lease created");
        service
            .sign(&lease.id, SigningParty::Landlord, date(2024, 6, 1))
            .expect("landlord signs");
        service
            .sign(&lease.id, SigningParty::Tenant, date(2024, 6, 1))
            .expect("tenant signs");
    }

    #[test]
    fn sweep_expires_only_elapsed_active_leases() {
        let (service, _) = build_service();
        activate(&service, "A-201", date(2025, 6, 30));
        activate(&service, "A-202", date(2025, 7, 1));
        let pending = service
            .create(terms("A-203", date(2025, 1, 31)))
            .expect("pending lease");

        let report = service
            .expire_elapsed(date(2025, 7, 1))
            .expect("sweep runs");

        assert_eq!(report.examined, 1);
        assert_eq!(report.expired.len(), 1);
        assert_eq!(report.skipped, 0);
        let expired = service.get(&report.expired[0]).expect("stored");
        assert_eq!(expired.unit_id, "A-201");
        assert_eq!(expired.status(), LeaseStatus::Expired);

        let still_pending = service.get(&pending.id).expect("stored");
        assert_eq!(still_pending.status(), LeaseStatus::Pending);
    }

    #[test]
    fn sweep_is_idempotent_within_a_day() {
        let (service, _) = build_service();
        activate(&service, "A-201", date(2025, 6, 30));
        activate(&service, "A-202", date(2025, 5, 31));

        let first = service.expire_elapsed(date(2025, 7, 2)).expect("first sweep");
        let second = service.expire_elapsed(date(2025, 7, 2)).expect("second sweep");

        assert_eq!(first.expired.len(), 2);
        assert_eq!(second.examined, 0);
        assert!(second.expired.is_empty());
    }
}

mod routes {
    use super::common::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tenant_billing::workflows::lease::lease_router;
    use tower::ServiceExt;

    async fn send(
        router: axum::Router,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(match body {
                Some(payload) => Body::from(payload.to_string()),
                None => Body::empty(),
            })
            .expect("request builds");
        let response = router.oneshot(request).await.expect("route executes");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), 4096)
            .await
            .expect("read body");
        let payload = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("json payload")
        };
        (status, payload)
    }

    #[tokio::test]
    async fn lifecycle_over_http() {
        let (service, _) = build_service();
        let router = lease_router(Arc::new(service));

        let (status, created) = send(
            router.clone(),
            "POST",
            "/api/v1/leases",
            Some(json!({
                "tenant_id": "tenant-7",
                "unit_id": "C-301",
                "start_date": "2024-07-01",
                "end_date": "2025-06-30"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["status"], "pending");
        let id = created["id"].as_str().expect("lease id").to_string();

        for party in ["landlord", "tenant"] {
            let (status, _) = send(
                router.clone(),
                "POST",
                &format!("/api/v1/leases/{id}/signatures"),
                Some(json!({ "party": party, "signed_on": "2024-06-25" })),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
        }

        let (status, fetched) =
            send(router.clone(), "GET", &format!("/api/v1/leases/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["status"], "active");
        assert_eq!(fetched["tenant_signed_on"], "2024-06-25");

        let (status, report) = send(
            router.clone(),
            "POST",
            "/api/v1/lease-expiry-sweep",
            Some(json!({ "today": "2025-07-01" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(report["expired"], json!([id.clone()]));

        let (status, error) = send(
            router.clone(),
            "POST",
            &format!("/api/v1/leases/{id}/cancel"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(error["error"], "cannot cancel a lease that is expired");
    }

    #[tokio::test]
    async fn unknown_lease_returns_not_found() {
        let (service, _) = build_service();
        let router = lease_router(Arc::new(service));
        let (status, _) = send(router, "GET", "/api/v1/leases/lease-404", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn sweep_accepts_empty_body() {
        let (service, _) = build_service();
        let router = lease_router(Arc::new(service));
        let (status, report) = send(router, "POST", "/api/v1/lease-expiry-sweep", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(report["examined"], 0);
    }
}
