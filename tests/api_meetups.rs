//! Integration tests per la macchina a stati degli inviti di meetup
//!
//! I test chiamano direttamente gli handler (sono normali funzioni async)
//! e osservano il fan-out dai canali della UserMap, senza passare dal
//! trasporto WebSocket.
//!
//! Richiedono un MySQL vivo raggiungibile via DATABASE_URL, quindi sono
//! marcati #[ignore]:
//!     DATABASE_URL=mysql://... cargo test -- --ignored

mod common;

#[cfg(test)]
mod meetup_tests {
    use super::common::*;
    use axum::extract::{Extension, Json, Path, State};
    use axum::http::StatusCode;
    use colleko_server::dtos::CreateMeetupDTO;
    use colleko_server::entities::{MeetupActivity, MeetupStatus};
    use colleko_server::services::{
        cancel_meetup, create_meetup, list_incoming_meetups, resolve_meetup, respond_to_meetup,
    };
    use colleko_server::ws::usermap::InternalSignal;
    use tokio::sync::mpsc::unbounded_channel;

    fn coffee_offer(receiver_id: i32) -> CreateMeetupDTO {
        CreateMeetupDTO {
            receiver_id,
            activity: MeetupActivity::Coffee,
            meetup_time: Some("14:30".to_string()),
            location_name: Some("Main Library".to_string()),
            message: Some("quick coffee between lectures?".to_string()),
        }
    }

    /// Round trip completo: create -> fan-out al receiver -> accept ->
    /// fan-out al sender con i dettagli esattamente come inviati -> resolve.
    #[tokio::test]
    #[ignore = "requires a running MySQL and DATABASE_URL"]
    async fn invitation_round_trip() {
        let state = create_db_state().await;
        let alice = seed_user(&state, "Alice").await;
        let bob = seed_user(&state, "Bob").await;

        // entrambi "online": i canali su cui osserviamo il fan-out
        let (alice_tx, mut alice_rx) = unbounded_channel();
        let (bob_tx, mut bob_rx) = unbounded_channel();
        state.users_online.register_online(alice.user_id, alice_tx);
        state.users_online.register_online(bob.user_id, bob_tx);

        let Json(created) = create_meetup(
            State(state.clone()),
            Extension(alice.clone()),
            Json(coffee_offer(bob.user_id)),
        )
        .await
        .expect("create_meetup failed");
        assert_eq!(created.status, MeetupStatus::Pending);

        // il receiver vede arrivare l'invito arricchito
        match bob_rx.recv().await {
            Some(InternalSignal::Meetup(incoming)) => {
                assert_eq!(incoming.meetup_id, created.meetup_id);
                assert_eq!(incoming.sender.as_ref().unwrap().user_id, alice.user_id);
            }
            other => panic!("expected Meetup signal, got {:?}", discriminant_name(&other)),
        }

        // e lo vede anche nella lista incoming (snapshot di riconnessione)
        let Json(incoming_list) =
            list_incoming_meetups(State(state.clone()), Extension(bob.clone()))
                .await
                .expect("list_incoming failed");
        assert!(incoming_list.iter().any(|m| m.meetup_id == created.meetup_id));

        // accept di Bob: la conferma arriva al mittente coi dettagli intatti
        let Json(accepted) = respond_to_meetup(
            State(state.clone()),
            Path((created.meetup_id, "accept".to_string())),
            Extension(bob.clone()),
        )
        .await
        .expect("respond failed");
        assert_eq!(accepted.status, MeetupStatus::Accepted);

        match alice_rx.recv().await {
            Some(InternalSignal::MeetupUpdate(update)) => {
                assert_eq!(update.status, MeetupStatus::Accepted);
                assert_eq!(update.activity, MeetupActivity::Coffee);
                assert_eq!(update.meetup_time.as_deref(), Some("14:30"));
                assert_eq!(update.location_name.as_deref(), Some("Main Library"));
            }
            other => panic!("expected MeetupUpdate, got {:?}", discriminant_name(&other)),
        }

        // resolve: terminale, spegne l'indicatore su entrambi i client
        let Json(resolved) = resolve_meetup(
            State(state.clone()),
            Path((created.meetup_id, "completed".to_string())),
            Extension(alice.clone()),
        )
        .await
        .expect("resolve failed");
        assert_eq!(resolved.status, MeetupStatus::Completed);

        // terminale = immutabile: ogni ulteriore transizione fallisce
        let err = respond_to_meetup(
            State(state.clone()),
            Path((created.meetup_id, "reject".to_string())),
            Extension(bob.clone()),
        )
        .await
        .expect_err("responding to a terminal invitation must fail");
        assert_eq!(err.status(), StatusCode::CONFLICT);

        let err = resolve_meetup(
            State(state.clone()),
            Path((created.meetup_id, "no_show".to_string())),
            Extension(bob),
        )
        .await
        .expect_err("resolving a terminal invitation must fail");
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }

    /// Esclusività: un solo invito attivo per coppia non ordinata.
    #[tokio::test]
    #[ignore = "requires a running MySQL and DATABASE_URL"]
    async fn only_one_active_invitation_per_pair() {
        let state = create_db_state().await;
        let alice = seed_user(&state, "Alice").await;
        let bob = seed_user(&state, "Bob").await;

        create_meetup(
            State(state.clone()),
            Extension(alice.clone()),
            Json(coffee_offer(bob.user_id)),
        )
        .await
        .expect("first invitation failed");

        // stessa direzione
        let err = create_meetup(
            State(state.clone()),
            Extension(alice.clone()),
            Json(coffee_offer(bob.user_id)),
        )
        .await
        .expect_err("duplicate invitation must be rejected");
        assert_eq!(err.status(), StatusCode::CONFLICT);

        // direzione opposta: la coppia è non ordinata
        let err = create_meetup(
            State(state.clone()),
            Extension(bob.clone()),
            Json(coffee_offer(alice.user_id)),
        )
        .await
        .expect_err("reverse invitation must be rejected while one is active");
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }

    /// Autorizzazione: solo il receiver risponde, solo il sender cancella,
    /// niente auto-inviti.
    #[tokio::test]
    #[ignore = "requires a running MySQL and DATABASE_URL"]
    async fn authorization_rules() {
        let state = create_db_state().await;
        let alice = seed_user(&state, "Alice").await;
        let bob = seed_user(&state, "Bob").await;
        let carol = seed_user(&state, "Carol").await;

        let err = create_meetup(
            State(state.clone()),
            Extension(alice.clone()),
            Json(coffee_offer(alice.user_id)),
        )
        .await
        .expect_err("self-invitation must fail");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let Json(created) = create_meetup(
            State(state.clone()),
            Extension(alice.clone()),
            Json(coffee_offer(bob.user_id)),
        )
        .await
        .expect("create failed");

        // né una terza persona né il mittente possono rispondere
        for intruder in [carol.clone(), alice.clone()] {
            let err = respond_to_meetup(
                State(state.clone()),
                Path((created.meetup_id, "accept".to_string())),
                Extension(intruder),
            )
            .await
            .expect_err("non-receiver response must fail");
            assert_eq!(err.status(), StatusCode::FORBIDDEN);
        }

        let err = cancel_meetup(
            State(state.clone()),
            Path(created.meetup_id),
            Extension(bob.clone()),
        )
        .await
        .expect_err("non-sender cancel must fail");
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
    }

    /// Cancel Request del mittente: il receiver vede sparire l'invito e la
    /// riga non è più azionabile.
    #[tokio::test]
    #[ignore = "requires a running MySQL and DATABASE_URL"]
    async fn sender_cancel_removes_the_pending_request() {
        let state = create_db_state().await;
        let alice = seed_user(&state, "Alice").await;
        let bob = seed_user(&state, "Bob").await;

        let (bob_tx, mut bob_rx) = unbounded_channel();
        state.users_online.register_online(bob.user_id, bob_tx);

        let Json(created) = create_meetup(
            State(state.clone()),
            Extension(alice.clone()),
            Json(coffee_offer(bob.user_id)),
        )
        .await
        .expect("create failed");

        // scarta il segnale di invito in arrivo
        let _ = bob_rx.recv().await;

        cancel_meetup(
            State(state.clone()),
            Path(created.meetup_id),
            Extension(alice.clone()),
        )
        .await
        .expect("cancel failed");

        match bob_rx.recv().await {
            Some(InternalSignal::MeetupRemoved(id)) => assert_eq!(id, created.meetup_id),
            other => panic!("expected MeetupRemoved, got {:?}", discriminant_name(&other)),
        }

        let err = respond_to_meetup(
            State(state.clone()),
            Path((created.meetup_id, "accept".to_string())),
            Extension(bob),
        )
        .await
        .expect_err("responding to a cancelled invitation must fail");
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    /// Due risposte in gara sullo stesso invito pending: ne vince una sola.
    #[tokio::test]
    #[ignore = "requires a running MySQL and DATABASE_URL"]
    async fn concurrent_responses_only_one_wins() {
        let state = create_db_state().await;
        let alice = seed_user(&state, "Alice").await;
        let bob = seed_user(&state, "Bob").await;

        let Json(created) = create_meetup(
            State(state.clone()),
            Extension(alice.clone()),
            Json(coffee_offer(bob.user_id)),
        )
        .await
        .expect("create failed");

        let accept = respond_to_meetup(
            State(state.clone()),
            Path((created.meetup_id, "accept".to_string())),
            Extension(bob.clone()),
        );
        let reject = respond_to_meetup(
            State(state.clone()),
            Path((created.meetup_id, "reject".to_string())),
            Extension(bob.clone()),
        );

        let (first, second) = tokio::join!(accept, reject);
        let outcomes = [first.is_ok(), second.is_ok()];
        assert_eq!(
            outcomes.iter().filter(|ok| **ok).count(),
            1,
            "exactly one of the racing responses must win"
        );
    }

    fn discriminant_name(signal: &Option<InternalSignal>) -> &'static str {
        match signal {
            None => "closed channel",
            Some(InternalSignal::Shutdown) => "Shutdown",
            Some(InternalSignal::Meetup(_)) => "Meetup",
            Some(InternalSignal::MeetupUpdate(_)) => "MeetupUpdate",
            Some(InternalSignal::MeetupRemoved(_)) => "MeetupRemoved",
            Some(InternalSignal::Error(_)) => "Error",
        }
    }
}
