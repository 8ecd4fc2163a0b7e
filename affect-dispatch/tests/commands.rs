use std::sync::Arc;
use std::time::Duration;

use affect_dispatch::prelude::*;

#[derive(Action, Clone, Debug, PartialEq)]
enum Msg {
    Type(&'static str),
    Search(&'static str),
    Tick,
    Stamped,
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Search {
    query: &'static str,
    searches: Vec<&'static str>,
    ticks: u32,
}

fn search_update(
    debouncer: Debouncer,
) -> impl Fn(Msg, &Arc<Search>) -> Operation<Search, Msg> + Send + Sync + 'static {
    move |action: Msg, state: &Arc<Search>| match action {
        Msg::Type(query) => Operation::new(Search {
            query,
            ..(**state).clone()
        })
        .with(debouncer.command(
            "search",
            Duration::from_millis(200),
            move || Msg::Search(query),
        )),
        Msg::Search(query) => {
            let mut next = (**state).clone();
            next.searches.push(query);
            Operation::new(next)
        }
        Msg::Tick => Operation::new(Search {
            ticks: state.ticks + 1,
            ..(**state).clone()
        }),
        Msg::Stamped => Operation::unchanged(state),
    }
}

#[tokio::test(start_paused = true)]
async fn test_debounced_typing_searches_once() {
    let host = SharedState::new(Search::default());
    let dispatcher = Dispatcher::new(host.clone(), search_update(Debouncer::new()));

    let (a, b, c) = futures::join!(
        dispatcher.send(Msg::Type("r")),
        dispatcher.send(Msg::Type("ru")),
        dispatcher.send(Msg::Type("rust")),
    );
    a.unwrap();
    b.unwrap();
    c.unwrap();

    let state = host.get();
    assert_eq!(state.query, "rust");
    assert_eq!(state.searches, vec!["rust"]);
}

#[tokio::test(start_paused = true)]
async fn test_delay_dispatches_after_pause() {
    let host = SharedState::new(Search::default());
    let dispatcher = Dispatcher::new(
        host.clone(),
        |action: Msg, state: &Arc<Search>| match action {
            Msg::Stamped => Operation::unchanged(state)
                .with(delay(Duration::from_secs(1), || Msg::Tick))
                .with(now(|_| Msg::Tick)),
            other => search_update(Debouncer::new())(other, state),
        },
    );

    let start = tokio::time::Instant::now();
    dispatcher.send(Msg::Stamped).await.unwrap();

    assert!(start.elapsed() >= Duration::from_secs(1));
    assert_eq!(host.get().ticks, 2);
}
