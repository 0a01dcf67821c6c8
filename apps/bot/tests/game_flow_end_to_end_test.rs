//! Full session runs: start transition, round loop, finish report.

mod common;

use bot::domain::state::{GameStatus, Identity};
use bot::services::game_flow::GameFlowService;
use bot::session::GameSession;
use common::{test_book, user, ScriptedMessenger};

fn preparing_session(names: &[&str]) -> GameSession {
    let session = GameSession::new(
        1,
        "tiny".to_string(),
        user(names[0]),
        "group-1".to_string(),
        test_book(),
    );
    for name in &names[1..] {
        session.add_player(user(name)).unwrap();
    }
    session
}

#[tokio::test]
async fn three_player_games_finish_after_exactly_one_elimination() {
    common::init_logging();
    let session = preparing_session(&["ana", "bo", "cy"]);
    session.claim_start().unwrap();

    let messenger = ScriptedMessenger::new();
    // Ordinals follow join order: ana #1, bo #2, cy #3. Both others vote
    // ana out; ana abstains.
    messenger.script(&user("ana"), &["a word", "0"]);
    messenger.script(&user("bo"), &["b word", "1"]);
    messenger.script(&user("cy"), &["c word", "1"]);

    let flow = GameFlowService::new(Some(11));
    let winner = flow.run(&session, &messenger).await.unwrap();

    assert_eq!(session.status(), GameStatus::Finished);
    assert_eq!(session.with_state(|state| state.round), 1);
    assert_eq!(session.player_count(), 2);
    assert!(session.with_state(|state| !state.has_active_user("id-ana")));

    // The winner matches the surviving composition: if the spy went out,
    // civilians won; otherwise the spy survived into the 1v1 and won.
    let expected = session.with_state(|state| {
        let (spies, _) = state.composition();
        if spies == 0 {
            Identity::Civilian
        } else {
            Identity::Spy
        }
    });
    assert_eq!(winner, expected);

    // One private reveal per player, one round announcement, one report.
    assert_eq!(messenger.private_log().len(), 3);
    assert_eq!(messenger.count_public_containing("Round "), 1);
    assert_eq!(messenger.count_public_containing("Game over"), 1);
    assert_eq!(messenger.count_public_containing("Spy word:"), 1);
}

#[tokio::test]
async fn the_start_transition_announces_roster_and_composition() {
    common::init_logging();
    let session = preparing_session(&["ana", "bo", "cy", "dee"]);
    session.claim_start().unwrap();

    let messenger = ScriptedMessenger::new();
    // Every ballot goes against #1 so the game ends quickly no matter who
    // the assigner made the spy.
    messenger.script(&user("ana"), &["w", "0"]);
    messenger.script(&user("bo"), &["x", "1"]);
    messenger.script(&user("cy"), &["y", "1"]);
    messenger.script(&user("dee"), &["z", "1"]);

    let flow = GameFlowService::new(Some(5));
    flow.run(&session, &messenger).await.unwrap();

    assert_eq!(messenger.count_public_containing("Players:"), 1);
    assert_eq!(
        messenger.count_public_containing("Identities have been handed out"),
        1
    );
    // Every reveal names a word and a number.
    let reveals = messenger.private_log();
    assert_eq!(reveals.len(), 4);
    assert!(reveals
        .iter()
        .all(|(_, text)| text.contains("Your word:") && text.contains("Your number:")));
}

#[tokio::test]
async fn four_player_games_can_end_with_a_spy_win_after_one_round() {
    common::init_logging();
    // With four starters the general rule applies: eliminating a civilian
    // leaves spies >= civilians - 1 and ends the game at once when the
    // roster drops to one spy and two civilians.
    let session = common::started_session(&["ana", "bo", "cy", "dee"], &[0]);
    let messenger = ScriptedMessenger::new();
    // Everyone piles on bo (#2), a civilian.
    messenger.script(&user("ana"), &["w", "2"]);
    messenger.script(&user("bo"), &["x", "0"]);
    messenger.script(&user("cy"), &["y", "2"]);
    messenger.script(&user("dee"), &["z", "2"]);

    let flow = GameFlowService::new(Some(13));
    let eliminated = flow.run_round(&session, &messenger).await.unwrap();
    let eliminated_name =
        session.with_state(|state| state.players[eliminated].user.username.clone());
    assert_eq!(eliminated_name, "bo");

    assert_eq!(
        session.with_state(|state| bot::domain::win::evaluate(state)),
        Some(Identity::Spy)
    );
}
