//! Dispatcher routing: commands get public answers, chatter is ignored.

mod common;

use std::sync::Arc;
use std::time::Duration;

use bot::gateway::{ChatUser, IncomingMessage};
use bot::services::dispatcher::Dispatcher;
use bot::services::registry::GameRegistry;
use bot::words::WordBook;
use common::{unique_user, RecordingGateway};

fn setup(gateway: &Arc<RecordingGateway>) -> Dispatcher {
    let words = Arc::new(WordBook::from_groups(vec![vec![
        "coffee".to_string(),
        "tea".to_string(),
    ]]));
    let registry = Arc::new(GameRegistry::new(
        gateway.clone(),
        words,
        "main".to_string(),
        Duration::from_millis(1),
        None,
    ));
    Dispatcher::new(
        registry,
        gateway.clone(),
        "main".to_string(),
        Duration::from_millis(1),
    )
}

fn message(user: &ChatUser, text: &str) -> IncomingMessage {
    IncomingMessage {
        user: user.clone(),
        text: text.to_string(),
    }
}

#[tokio::test]
async fn commands_are_answered_in_the_channel() {
    common::init_logging();
    let gateway = RecordingGateway::new();
    let dispatcher = setup(&gateway);
    let ana = unique_user("ana");
    let bo = unique_user("bo");

    dispatcher.handle(&message(&ana, "/games")).await;
    assert!(gateway.sent_to("main")[0].contains("No games yet"));

    dispatcher.handle(&message(&ana, "/newgame ship")).await;
    assert!(gateway.sent_to("main")[1].contains("created"));

    dispatcher.handle(&message(&bo, "/join ship")).await;
    assert!(gateway.sent_to("main")[2].contains("joined"));

    // Rejections surface their player-facing reason.
    dispatcher.handle(&message(&bo, "/start ship")).await;
    assert_eq!(
        gateway.sent_to("main")[3],
        "Only the creator can start the game."
    );
}

#[tokio::test]
async fn plain_chatter_gets_no_reply() {
    common::init_logging();
    let gateway = RecordingGateway::new();
    let dispatcher = setup(&gateway);
    let ana = unique_user("ana");

    dispatcher.handle(&message(&ana, "good morning")).await;
    dispatcher.handle(&message(&ana, "/unknowncmd foo")).await;
    assert!(gateway.sent.lock().is_empty());
}
