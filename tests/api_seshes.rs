//! Integration tests per il ciclo di vita dei raduni
//!
//! Come per i meetup: handler chiamati direttamente, fan-out osservato dai
//! feed broadcast. Richiedono un MySQL vivo via DATABASE_URL:
//!     DATABASE_URL=mysql://... cargo test -- --ignored

mod common;

#[cfg(test)]
mod sesh_tests {
    use super::common::*;
    use axum::extract::{Extension, Json, Path, State};
    use axum::http::StatusCode;
    use colleko_server::dtos::{CreateSeshDTO, WsEventDTO};
    use colleko_server::entities::SeshActivity;
    use colleko_server::services::{
        create_sesh, end_sesh, join_sesh, leave_sesh, list_sesh_participants,
    };

    fn study_sesh(max_participants: i32) -> CreateSeshDTO {
        CreateSeshDTO {
            activity_type: SeshActivity::Study,
            title: "Library grind".to_string(),
            max_participants,
        }
    }

    /// Scenario: gara sull'ultimo slot. max=2, il creatore conta 1: un solo
    /// posto libero, due join concorrenti, ne passa esattamente uno.
    #[tokio::test]
    #[ignore = "requires a running MySQL and DATABASE_URL"]
    async fn race_at_capacity_exactly_one_join_wins() {
        let state = create_db_state().await;
        let creator = seed_user(&state, "Creator").await;
        let p1 = seed_user(&state, "Paola").await;
        let p2 = seed_user(&state, "Piero").await;

        let Json(sesh) = create_sesh(
            State(state.clone()),
            Extension(creator.clone()),
            Json(study_sesh(2)),
        )
        .await
        .expect("create_sesh failed");
        assert_eq!(sesh.current_count, 1);

        let join1 = join_sesh(
            State(state.clone()),
            Path(sesh.sesh_id),
            Extension(p1.clone()),
        );
        let join2 = join_sesh(
            State(state.clone()),
            Path(sesh.sesh_id),
            Extension(p2.clone()),
        );

        let (first, second) = tokio::join!(join1, join2);
        let winners = [&first, &second].iter().filter(|r| r.is_ok()).count();
        assert_eq!(winners, 1, "exactly one concurrent join must succeed");

        let loser = if first.is_err() { first } else { second };
        let err = loser.expect_err("one join must have lost");
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert!(err.message().contains("full"));

        // l'invariante di capacità regge: current_count == max
        let Json(listing) =
            list_sesh_participants(State(state.clone()), Path(sesh.sesh_id))
                .await
                .expect("participants listing failed");
        assert_eq!(listing.participants.len(), 2);
    }

    /// Capacità sotto N concorrenti: con 2 slot liberi e 4 candidati ne
    /// entrano esattamente 2.
    #[tokio::test]
    #[ignore = "requires a running MySQL and DATABASE_URL"]
    async fn n_concurrent_joins_fill_exactly_the_free_slots() {
        let state = create_db_state().await;
        let creator = seed_user(&state, "Creator").await;

        let Json(sesh) = create_sesh(
            State(state.clone()),
            Extension(creator.clone()),
            Json(study_sesh(3)),
        )
        .await
        .expect("create_sesh failed");

        let mut joiners = Vec::new();
        for name in ["A", "B", "C", "D"] {
            joiners.push(seed_user(&state, name).await);
        }

        let results = futures::future::join_all(joiners.into_iter().map(|user| {
            let state = state.clone();
            let sesh_id = sesh.sesh_id;
            async move { join_sesh(State(state), Path(sesh_id), Extension(user)).await }
        }))
        .await;

        let successes = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 2, "only the two free slots may be filled");
        for r in results.iter().filter(|r| r.is_err()) {
            let err = r.as_ref().err().unwrap();
            assert_eq!(err.status(), StatusCode::CONFLICT);
        }
    }

    /// Scenario: il creatore termina il raduno. La vista active si svuota
    /// via fan-out e i join successivi falliscono.
    #[tokio::test]
    #[ignore = "requires a running MySQL and DATABASE_URL"]
    async fn creator_ends_gathering_for_everyone() {
        let state = create_db_state().await;
        let creator = seed_user(&state, "Creator").await;
        let p1 = seed_user(&state, "Paola").await;
        let p2 = seed_user(&state, "Piero").await;
        let p3 = seed_user(&state, "Pietro").await;

        let Json(sesh) = create_sesh(
            State(state.clone()),
            Extension(creator.clone()),
            Json(study_sesh(5)),
        )
        .await
        .expect("create_sesh failed");

        join_sesh(State(state.clone()), Path(sesh.sesh_id), Extension(p1.clone()))
            .await
            .expect("p1 join failed");
        join_sesh(State(state.clone()), Path(sesh.sesh_id), Extension(p2.clone()))
            .await
            .expect("p2 join failed");

        // {creatore} ∪ partecipanti, creatore per primo
        let Json(listing) = list_sesh_participants(State(state.clone()), Path(sesh.sesh_id))
            .await
            .expect("participants listing failed");
        assert_eq!(listing.participants.len(), 3);
        assert_eq!(listing.participants[0].user_id, creator.user_id);

        // solo il creatore può terminare
        let err = end_sesh(State(state.clone()), Path(sesh.sesh_id), Extension(p1.clone()))
            .await
            .expect_err("non-creator end must fail");
        assert_eq!(err.status(), StatusCode::FORBIDDEN);

        let mut feed = state.feeds.subscribe_seshes();
        end_sesh(
            State(state.clone()),
            Path(sesh.sesh_id),
            Extension(creator.clone()),
        )
        .await
        .expect("end_sesh failed");

        // l'evento di rimozione raggiunge il feed condiviso
        match feed.recv().await {
            Ok(event) => {
                assert!(matches!(*event, WsEventDTO::SeshRemoved { sesh_id } if sesh_id == sesh.sesh_id))
            }
            Err(e) => panic!("expected SeshRemoved on the feed, got {e:?}"),
        }

        // un join dopo la terminazione: il raduno non è più attivo
        let err = join_sesh(State(state.clone()), Path(sesh.sesh_id), Extension(p3))
            .await
            .expect_err("join after end must fail");
        assert_eq!(err.status(), StatusCode::NOT_FOUND);

        // terminale = immutabile anche per il creatore
        let err = end_sesh(State(state.clone()), Path(sesh.sesh_id), Extension(creator))
            .await
            .expect_err("ending twice must fail");
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }

    /// Leave: il creatore non lascia (fallisce chiuso), un partecipante sì,
    /// un estraneo no.
    #[tokio::test]
    #[ignore = "requires a running MySQL and DATABASE_URL"]
    async fn leave_semantics() {
        let state = create_db_state().await;
        let creator = seed_user(&state, "Creator").await;
        let p1 = seed_user(&state, "Paola").await;
        let stranger = seed_user(&state, "Sandro").await;

        let Json(sesh) = create_sesh(
            State(state.clone()),
            Extension(creator.clone()),
            Json(study_sesh(5)),
        )
        .await
        .expect("create_sesh failed");

        let Json(joined) =
            join_sesh(State(state.clone()), Path(sesh.sesh_id), Extension(p1.clone()))
                .await
                .expect("join failed");
        assert_eq!(joined.current_count, 2);

        // join del creatore: relazione malformata
        let err = join_sesh(
            State(state.clone()),
            Path(sesh.sesh_id),
            Extension(creator.clone()),
        )
        .await
        .expect_err("creator joining own sesh must fail");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        // doppio join dello stesso utente
        let err = join_sesh(State(state.clone()), Path(sesh.sesh_id), Extension(p1.clone()))
            .await
            .expect_err("double join must fail");
        assert_eq!(err.status(), StatusCode::CONFLICT);

        // il creatore che "lascia" viene respinto verso end
        let err = leave_sesh(
            State(state.clone()),
            Path(sesh.sesh_id),
            Extension(creator.clone()),
        )
        .await
        .expect_err("creator leave must fail closed");
        assert_eq!(err.status(), StatusCode::CONFLICT);

        let err = leave_sesh(
            State(state.clone()),
            Path(sesh.sesh_id),
            Extension(stranger),
        )
        .await
        .expect_err("stranger leave must fail");
        assert_eq!(err.status(), StatusCode::NOT_FOUND);

        let Json(after_leave) =
            leave_sesh(State(state.clone()), Path(sesh.sesh_id), Extension(p1))
                .await
                .expect("participant leave failed");
        assert_eq!(after_leave.current_count, 1);
    }
}
