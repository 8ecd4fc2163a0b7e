use std::sync::Arc;

use affect_dispatch::prelude::*;
use parking_lot::Mutex;

#[derive(Action, Clone, Debug, PartialEq)]
#[action(rename_all = "SCREAMING_SNAKE_CASE")]
enum ChildMsg {
    ChildAction1,
    ChildAction2,
}

#[derive(Action, Clone, Debug, PartialEq)]
#[action(rename_all = "SCREAMING_SNAKE_CASE")]
enum ParentMsg {
    ParentAction(ChildMsg),
}

#[derive(Debug, Clone, PartialEq)]
struct ChildState {
    counter: i32,
}

#[derive(Debug, Clone, PartialEq)]
struct ParentState {
    child1: Arc<ChildState>,
    child2: Arc<ChildState>,
}

fn child_update(action: ChildMsg, state: &Arc<ChildState>) -> Operation<ChildState, ChildMsg> {
    match action {
        ChildMsg::ChildAction1 => Operation::new(ChildState {
            counter: state.counter + 1,
        })
        .with(Command::resolve(ChildMsg::ChildAction2)),
        ChildMsg::ChildAction2 => Operation::new(ChildState {
            counter: state.counter + 3,
        }),
    }
}

fn parent_update(action: ParentMsg, state: &Arc<ParentState>) -> Operation<ParentState, ParentMsg> {
    match action {
        ParentMsg::ParentAction(child) => {
            let before = Arc::clone(&state.child1);
            lift_operation(
                state,
                &before,
                child_update(child, &before),
                |parent, child1| ParentState {
                    child1,
                    ..parent.clone()
                },
                ParentMsg::ParentAction,
            )
        }
    }
}

fn initial() -> ParentState {
    ParentState {
        child1: Arc::new(ChildState { counter: 1 }),
        child2: Arc::new(ChildState { counter: 3 }),
    }
}

#[tokio::test]
async fn test_child_dispatcher_wraps_actions() {
    let received = Arc::new(Mutex::new(Vec::new()));
    let sink = received.clone();
    let watched = Dispatcher::builder(
        SharedState::new(initial()),
        move |action: ParentMsg, state: &Arc<ParentState>| {
            sink.lock().push(action);
            Operation::unchanged(state)
        },
    )
    .build_watched();

    let child = watched.clone().map(ParentMsg::ParentAction);
    child.send(ChildMsg::ChildAction1).await.unwrap();

    assert_eq!(
        *received.lock(),
        vec![ParentMsg::ParentAction(ChildMsg::ChildAction1)]
    );
    assert_eq!(watched.action_types(), vec!["PARENT_ACTION"]);
}

#[tokio::test]
async fn test_child_commands_flow_back_through_parent() {
    let host = SharedState::new(initial());
    let watched = Dispatcher::builder(host.clone(), parent_update).build_watched();
    let child = map_dispatcher(ParentMsg::ParentAction, watched.clone());

    child.send(ChildMsg::ChildAction1).await.unwrap();

    let child_types: Vec<&str> = watched
        .actions()
        .into_iter()
        .flatten()
        .map(|ParentMsg::ParentAction(child)| child.name())
        .collect();
    assert_eq!(child_types, vec!["CHILD_ACTION_1", "CHILD_ACTION_2"]);

    let state = host.get();
    assert_eq!(state.child1.counter, 5);
    assert_eq!(state.child2.counter, 3);
}

#[tokio::test]
async fn test_unchanged_child_keeps_parent_identity() {
    let host = SharedState::new(initial());
    let before = host.get();
    let dispatcher = Dispatcher::new(
        host.clone(),
        |action: ParentMsg, state: &Arc<ParentState>| match action {
            ParentMsg::ParentAction(_) => {
                let child = Arc::clone(&state.child2);
                let child_op: Operation<ChildState, ChildMsg> = Operation::unchanged(&child);
                lift_operation(
                    state,
                    &child,
                    child_op,
                    |parent, child2| ParentState {
                        child2,
                        ..parent.clone()
                    },
                    ParentMsg::ParentAction,
                )
            }
        },
    );

    dispatcher
        .map(ParentMsg::ParentAction)
        .send(ChildMsg::ChildAction2)
        .await
        .unwrap();

    assert!(Arc::ptr_eq(&before, &host.get()));
    assert_eq!(host.commit_count(), 0);
}

#[tokio::test]
async fn test_sentinel_through_mapped_dispatcher_is_dropped() {
    let watched = Dispatcher::builder(SharedState::new(initial()), parent_update).build_watched();
    let child = watched.clone().map(ParentMsg::ParentAction);

    child.dispatch(None).await.unwrap();

    assert!(watched.log().is_empty());
}

#[tokio::test]
async fn test_map_commands_in_parent_update() {
    let host = SharedState::new(initial());
    let watched = Dispatcher::builder(
        host.clone(),
        |action: ParentMsg, state: &Arc<ParentState>| match action {
            ParentMsg::ParentAction(child) => {
                let op = child_update(child, &state.child1);
                let child1 = Arc::clone(&op.state);
                Operation::new(ParentState {
                    child1,
                    ..(**state).clone()
                })
                .with_commands(map_commands(ParentMsg::ParentAction, op.commands))
            }
        },
    )
    .build_watched();

    watched
        .send(ParentMsg::ParentAction(ChildMsg::ChildAction1))
        .await
        .unwrap();

    assert_eq!(watched.actions().len(), 2);
    assert_eq!(host.get().child1.counter, 5);
}
