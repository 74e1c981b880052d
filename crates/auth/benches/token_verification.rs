use criterion::{black_box, criterion_group, criterion_main, Criterion};

use chrono::{Duration, Utc};
use gatehouse_auth::{
    authorize, AccessPolicy, InMemoryRevocationRegistry, Principal, Role, RouteAccess, SigningKey,
    SubjectId, TokenSigner, TokenVerifier,
};
use std::sync::Arc;

const SECRET: &str = "bench-secret-bench-secret-bench-secret";

fn bench_verify(c: &mut Criterion) {
    let key = SigningKey::from_bytes(SECRET).expect("bench key");
    let registry = Arc::new(InMemoryRevocationRegistry::new());
    let verifier = TokenVerifier::new(&key, registry);
    let signer = TokenSigner::new(&key);
    let now = Utc::now();
    let issued = signer
        .issue(
            SubjectId::new("bench-user").expect("subject"),
            vec![Role::new("ADMIN"), Role::new("EMPLOYEE")],
            Duration::hours(1),
            now,
        )
        .expect("issue");

    let rt = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("runtime");

    c.bench_function("token_decode_local_checks", |b| {
        b.iter(|| verifier.decode(black_box(&issued.token), now).expect("decode"))
    });

    c.bench_function("token_verify_with_revocation_lookup", |b| {
        b.iter(|| {
            rt.block_on(verifier.verify(black_box(&issued.token), now))
                .expect("verify")
        })
    });
}

fn bench_authorize(c: &mut Criterion) {
    let principal = Principal::new(
        SubjectId::new("bench-user").expect("subject"),
        ["EMPLOYEE", "AUDITOR", "ADMIN"].into_iter().map(Role::from),
    );
    let access = RouteAccess::new(
        [AccessPolicy::requires_any_of(["OWNER"])].into_iter().collect(),
        [AccessPolicy::requires_any_of(["ADMIN", "MANAGER"])].into_iter().collect(),
    );

    c.bench_function("authorize_fallthrough_to_resource", |b| {
        b.iter(|| authorize(black_box(&principal), black_box(&access)))
    });
}

criterion_group!(benches, bench_verify, bench_authorize);
criterion_main!(benches);
