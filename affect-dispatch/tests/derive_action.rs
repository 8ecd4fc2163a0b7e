use affect_dispatch::Action;

#[derive(Action, Clone, Debug)]
enum Plain {
    Tick,
    Resize(u16, u16),
    Open { path: String },
}

#[derive(Action, Clone, Debug)]
#[action(rename_all = "SCREAMING_SNAKE_CASE")]
enum Screaming {
    FetchStuff,
    DidFetchStuff(Vec<u8>),
    #[action(rename = "NOOP")]
    NoOp,
}

#[derive(Action, Clone, Debug)]
#[action(rename_all = "kebab-case")]
enum Kebab {
    SearchQueryChange { query: String },
}

#[derive(Action, Clone, Debug)]
#[action(rename_all = "snake_case")]
enum Snake {
    DidLoad,
}

#[derive(Action, Clone, Debug)]
#[action(rename_all = "SCREAMING_SNAKE_CASE")]
enum Numbered {
    ChildAction1,
    ChildAction2(u8),
}

#[derive(Action, Clone, Debug)]
enum Generic<T: Clone + std::fmt::Debug + Send + Sync + 'static> {
    Loaded(T),
}

#[test]
fn test_default_names_are_variant_names() {
    assert_eq!(Plain::Tick.name(), "Tick");
    assert_eq!(Plain::Resize(80, 24).name(), "Resize");
    assert_eq!(
        Plain::Open {
            path: "a.txt".into()
        }
        .name(),
        "Open"
    );
}

#[test]
fn test_rename_all_rules() {
    assert_eq!(Screaming::FetchStuff.name(), "FETCH_STUFF");
    assert_eq!(Screaming::DidFetchStuff(vec![1]).name(), "DID_FETCH_STUFF");
    assert_eq!(
        Kebab::SearchQueryChange {
            query: String::new()
        }
        .name(),
        "search-query-change"
    );
    assert_eq!(Snake::DidLoad.name(), "did_load");
}

#[test]
fn test_variant_rename_wins() {
    assert_eq!(Screaming::NoOp.name(), "NOOP");
}

#[test]
fn test_generic_enum() {
    assert_eq!(Generic::Loaded(3_u8).name(), "Loaded");
}

#[test]
fn test_trailing_digits_get_their_own_part() {
    assert_eq!(Numbered::ChildAction1.name(), "CHILD_ACTION_1");
    assert_eq!(Numbered::ChildAction2(0).name(), "CHILD_ACTION_2");
}
