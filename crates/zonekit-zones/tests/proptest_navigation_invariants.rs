//! Property-based invariant tests for navigation and selection.
//!
//! 1. Clamped zones stay put past either end
//! 2. Looping zones wrap first <-> last
//! 3. Navigation only ever lands on enabled, visible items
//! 4. Follow-focus keeps `selection == {focused}` and `anchor == focused`
//! 5. Range selection is the contiguous enabled span between anchor and focus

use proptest::prelude::*;
use zonekit_zones::command::{ZoneAction, ZoneCommand, ZoneOptions, reduce_zone};
use zonekit_zones::{
    Direction, FocusZoneState, GlobalFocusState, ItemId, Role, SelectConfig, ZoneConfig, ZoneId, ZoneRegistry,
};

type Registry = ZoneRegistry<(), ()>;

fn names(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("i{i}")).collect()
}

fn registry(n: usize, looping: bool, select: SelectConfig, disabled: Vec<bool>) -> Registry {
    let mut reg = Registry::new();
    let items = names(n);
    reg.register(
        ZoneConfig::fixed("z", Role::Listbox, items.clone())
            .looping(looping)
            .select(select)
            .disabled(move |_, id| {
                items
                    .iter()
                    .position(|name| id == name.as_str())
                    .is_some_and(|i| disabled.get(i).copied().unwrap_or(false))
            }),
    );
    reg
}

fn run(reg: &Registry, focus: &GlobalFocusState, cmd: ZoneCommand) -> GlobalFocusState {
    reduce_zone(&(), focus, reg, &cmd, ZoneOptions::default())
        .expect("registered zone")
        .focus
        .unwrap_or_else(|| focus.clone())
}

fn focus_at(reg: &Registry, item: usize) -> GlobalFocusState {
    run(
        reg,
        &GlobalFocusState::new(),
        ZoneCommand::in_zone("z", ZoneAction::Focus(ItemId::from(format!("i{item}")))),
    )
}

fn zone_state(focus: &GlobalFocusState) -> FocusZoneState {
    focus.zone_or_default(&ZoneId::from("z"))
}

fn index_of(id: &ItemId) -> usize {
    id.as_str()[1..].parse().expect("generated id")
}

fn direction() -> impl Strategy<Value = Direction> {
    prop_oneof![
        Just(Direction::Up),
        Just(Direction::Down),
        Just(Direction::Home),
        Just(Direction::End),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn clamp_is_idempotent(n in 1usize..12, extra in 1usize..5) {
        let reg = registry(n, false, SelectConfig::none(), Vec::new());
        let mut focus = focus_at(&reg, n - 1);
        for _ in 0..extra {
            focus = run(&reg, &focus, ZoneCommand::navigate(Direction::Down));
        }
        prop_assert_eq!(zone_state(&focus).focused, Some(ItemId::from(format!("i{}", n - 1))));

        let mut focus = focus_at(&reg, 0);
        for _ in 0..extra {
            focus = run(&reg, &focus, ZoneCommand::navigate(Direction::Up));
        }
        prop_assert_eq!(zone_state(&focus).focused, Some(ItemId::from("i0")));
    }

    #[test]
    fn loop_wraps(n in 2usize..12) {
        let reg = registry(n, true, SelectConfig::none(), Vec::new());
        let wrapped = run(&reg, &focus_at(&reg, n - 1), ZoneCommand::navigate(Direction::Down));
        prop_assert_eq!(zone_state(&wrapped).focused, Some(ItemId::from("i0")));
        let wrapped = run(&reg, &focus_at(&reg, 0), ZoneCommand::navigate(Direction::Up));
        prop_assert_eq!(zone_state(&wrapped).focused, Some(ItemId::from(format!("i{}", n - 1))));
    }

    #[test]
    fn navigation_lands_on_enabled_items(
        disabled in prop::collection::vec(any::<bool>(), 1..12),
        looping in any::<bool>(),
        moves in prop::collection::vec(direction(), 1..20),
    ) {
        let n = disabled.len();
        let reg = registry(n, looping, SelectConfig::none(), disabled.clone());
        let mut focus = run(&reg, &GlobalFocusState::new(), ZoneCommand::in_zone("z", ZoneAction::ActivateZone));
        for dir in moves {
            focus = run(&reg, &focus, ZoneCommand::navigate(dir));
            if let Some(item) = zone_state(&focus).focused {
                prop_assert!(!disabled[index_of(&item)]);
            }
        }
        if disabled.iter().all(|d| *d) {
            prop_assert_eq!(zone_state(&focus).focused, None);
        }
    }

    #[test]
    fn follow_focus_tracks_every_step(
        n in 2usize..10,
        moves in prop::collection::vec(direction(), 1..20),
    ) {
        let reg = registry(n, false, SelectConfig::single().follow_focus(true), Vec::new());
        let mut focus = focus_at(&reg, 0);
        for dir in moves {
            let before = zone_state(&focus).focused;
            focus = run(&reg, &focus, ZoneCommand::navigate(dir));
            let state = zone_state(&focus);
            if state.focused != before {
                let item = state.focused.clone().expect("moved to an item");
                prop_assert_eq!(state.selection.len(), 1);
                prop_assert!(state.selection.contains(&item));
                prop_assert_eq!(state.anchor, Some(item));
            }
        }
    }

    #[test]
    fn range_is_contiguous_span(
        n in 3usize..12,
        start in 0usize..12,
        moves in prop::collection::vec(prop_oneof![Just(Direction::Up), Just(Direction::Down)], 1..15),
    ) {
        let start = start % n;
        let reg = registry(n, false, SelectConfig::multiple(), Vec::new());
        let mut focus = run(
            &reg,
            &GlobalFocusState::new(),
            ZoneCommand::in_zone("z", ZoneAction::Select {
                item: Some(ItemId::from(format!("i{start}"))),
                op: zonekit_zones::SelectOp::Replace,
            }),
        );
        for dir in moves {
            focus = run(&reg, &focus, ZoneCommand::extend(dir));
        }
        let state = zone_state(&focus);
        let at = index_of(state.focused.as_ref().expect("focused"));
        let (lo, hi) = if start <= at { (start, at) } else { (at, start) };
        let expected: Vec<ItemId> = (lo..=hi).map(|i| ItemId::from(format!("i{i}"))).collect();
        let mut actual: Vec<ItemId> = state.selection.iter().cloned().collect();
        actual.sort_by_key(index_of);
        prop_assert_eq!(actual, expected);
        prop_assert_eq!(state.anchor, Some(ItemId::from(format!("i{start}"))));
    }
}
