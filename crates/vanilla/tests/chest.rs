//! Chests: pairing through the causal rules, opening, lids and waterlogging.

mod common;

use common::{Fixture, ORIGIN};
use tessera_engine::behavior::{self, use_block, InteractionResult, Shape};
use tessera_engine::capability::{tick_aux_states, FluidKind, FluidState};
use tessera_engine::combine::{CombineResult, ContainerView};
use tessera_engine::world::aux_state::AuxHandle;
use tessera_engine::world::position::{BlockPos, Direction};
use tessera_vanilla::behaviors::{chest, waterlog};
use tessera_vanilla::rules::helpers::block_set;
use tessera_vanilla::simulation;

fn east_of(pos: BlockPos) -> BlockPos {
    pos.offset(Direction::East)
}

fn chest_facing(fx: &Fixture, facing: &str) -> tessera_engine::world::block::BlockId {
    fx.state("chest", &[("facing", facing), ("type", "single")])
}

/// Two north-facing chests at `ORIGIN` and one step east.
fn double_chest(fx: &Fixture) -> (BlockPos, BlockPos) {
    let east = east_of(ORIGIN);
    fx.place(ORIGIN, fx.palette.chest);
    fx.place(east, fx.palette.chest);
    (ORIGIN, east)
}

// ---------------------------------------------------------------------------
// Pairing
// ---------------------------------------------------------------------------

#[test]
fn second_chest_pairs_with_the_first() {
    let fx = Fixture::new();
    let (left, right) = double_chest(&fx);

    assert_eq!(fx.value_at(left, "type"), Some("left"));
    assert_eq!(fx.value_at(right, "type"), Some("right"));
    assert_eq!(fx.value_at(left, "facing"), Some("north"));
    assert_eq!(fx.value_at(right, "facing"), Some("north"));
}

#[test]
fn pairing_does_not_depend_on_placement_order() {
    let fx = Fixture::new();
    let east = east_of(ORIGIN);
    fx.place(east, fx.palette.chest);
    fx.place(ORIGIN, fx.palette.chest);

    assert_eq!(fx.value_at(ORIGIN, "type"), Some("left"));
    assert_eq!(fx.value_at(east, "type"), Some("right"));
}

#[test]
fn pairing_cascade_is_recorded_in_the_graph() {
    let fx = Fixture::new();
    fx.place(ORIGIN, fx.palette.chest);
    let cascade = fx.place(east_of(ORIGIN), fx.palette.chest);

    // Placement, both halves switch type, then each notifies its four
    // horizontal neighbors.
    assert_eq!(cascade.executed, 3 + 8);
    assert_eq!(cascade.changes.len(), 3);
    assert!(cascade.graph.to_dot().contains("Set (1,64,0)"));
}

#[test]
fn chests_with_different_facings_stay_single() {
    let fx = Fixture::new();
    let east = east_of(ORIGIN);
    fx.place(ORIGIN, chest_facing(&fx, "north"));
    fx.place(east, chest_facing(&fx, "south"));

    assert_eq!(fx.value_at(ORIGIN, "type"), Some("single"));
    assert_eq!(fx.value_at(east, "type"), Some("single"));
}

#[test]
fn chests_behind_each_other_stay_single() {
    let fx = Fixture::new();
    let north = ORIGIN.offset(Direction::North);
    fx.place(ORIGIN, fx.palette.chest);
    fx.place(north, fx.palette.chest);

    assert_eq!(fx.value_at(ORIGIN, "type"), Some("single"));
    assert_eq!(fx.value_at(north, "type"), Some("single"));
}

#[test]
fn third_chest_does_not_steal_a_half() {
    let fx = Fixture::new();
    let (left, right) = double_chest(&fx);
    let third = east_of(right);
    fx.place(third, fx.palette.chest);

    assert_eq!(fx.value_at(left, "type"), Some("left"));
    assert_eq!(fx.value_at(right, "type"), Some("right"));
    assert_eq!(fx.value_at(third, "type"), Some("single"));
}

#[test]
fn chests_placed_on_both_sides_in_one_cascade_leave_no_stranded_half() {
    let fx = Fixture::new();
    let west = ORIGIN.offset(Direction::West);
    let east = east_of(ORIGIN);
    fx.place(ORIGIN, fx.palette.chest);

    let old = |pos| fx.world.get_block(pos);
    simulation::cascade(
        &fx.world,
        &fx.registry,
        &fx.rules,
        vec![
            block_set(west, old(west), fx.palette.chest),
            block_set(east, old(east), fx.palette.chest),
        ],
    );

    let mut paired = 0;
    for pos in [west, ORIGIN, east] {
        let result = use_block(&fx.registry, &fx.world, pos, None);
        match fx.value_at(pos, "type") {
            Some("single") => assert_eq!(
                result,
                InteractionResult::OpenContainer(CombineResult::Single(AuxHandle(pos)))
            ),
            _ => {
                paired += 1;
                let InteractionResult::OpenContainer(opened) = &result else {
                    panic!("{pos:?} claims a partner but use gave {result:?}");
                };
                assert!(opened.is_combined(), "{pos:?} opens as {opened:?}");
            }
        }
    }
    assert_eq!(paired, 2);
}

#[test]
fn chest_and_trapped_chest_do_not_pair() {
    let fx = Fixture::new();
    let east = east_of(ORIGIN);
    fx.place(ORIGIN, fx.palette.chest);
    fx.place(east, fx.state("trapped_chest", &[]));

    assert_eq!(fx.value_at(ORIGIN, "type"), Some("single"));
    assert_eq!(fx.value_at(east, "type"), Some("single"));
}

#[test]
fn trapped_chests_pair_with_each_other() {
    let fx = Fixture::new();
    let trapped = fx.state("trapped_chest", &[]);
    let east = east_of(ORIGIN);
    fx.place(ORIGIN, trapped);
    fx.place(east, trapped);

    assert_eq!(fx.value_at(ORIGIN, "type"), Some("left"));
    assert_eq!(fx.value_at(east, "type"), Some("right"));
}

#[test]
fn breaking_one_half_reverts_the_other() {
    let fx = Fixture::new();
    let (left, right) = double_chest(&fx);
    fx.place(right, fx.palette.air);

    assert_eq!(fx.value_at(left, "type"), Some("single"));
    assert!(fx.world.get_aux(right).is_none());
    assert!(fx.world.get_aux(left).is_some());
}

#[test]
fn half_keeps_its_record_while_pairing() {
    let fx = Fixture::new();
    fx.place(ORIGIN, fx.palette.chest);
    assert!(fx.world.get_aux(ORIGIN).is_some());
    fx.place(east_of(ORIGIN), fx.palette.chest);

    assert_eq!(fx.world.aux_count(), 2);
}

// ---------------------------------------------------------------------------
// Use
// ---------------------------------------------------------------------------

#[test]
fn using_either_half_opens_the_double_chest() {
    let fx = Fixture::new();
    let (left, right) = double_chest(&fx);
    let expected = CombineResult::Combined {
        primary: AuxHandle(left),
        secondary: AuxHandle(right),
    };

    for pos in [left, right] {
        let result = use_block(&fx.registry, &fx.world, pos, None);
        assert_eq!(result, InteractionResult::OpenContainer(expected.clone()));
    }

    let view = ContainerView::open(&fx.world, &expected).expect("both records exist");
    assert_eq!(view.len(), 2 * chest::SLOTS);
    assert!(view.is_double());
}

#[test]
fn single_chest_opens_alone() {
    let fx = Fixture::new();
    fx.place(ORIGIN, fx.palette.chest);

    let result = use_block(&fx.registry, &fx.world, ORIGIN, None);
    assert_eq!(
        result,
        InteractionResult::OpenContainer(CombineResult::Single(AuxHandle(ORIGIN)))
    );
}

#[test]
fn solid_block_on_the_lid_blocks_opening() {
    let fx = Fixture::new();
    fx.place(ORIGIN, fx.palette.chest);
    fx.place(ORIGIN.above(), fx.palette.stone);

    assert!(chest::is_blocked(&fx.registry, &fx.world, ORIGIN));
    let result = use_block(&fx.registry, &fx.world, ORIGIN, None);
    assert_eq!(result, InteractionResult::Consume);
}

#[test]
fn glass_on_the_lid_does_not_block() {
    let fx = Fixture::new();
    fx.place(ORIGIN, fx.palette.chest);
    fx.place(ORIGIN.above(), fx.palette.glass);

    assert!(!chest::is_blocked(&fx.registry, &fx.world, ORIGIN));
    assert!(matches!(
        use_block(&fx.registry, &fx.world, ORIGIN, None),
        InteractionResult::OpenContainer(_)
    ));
}

#[test]
fn blocked_partner_blocks_the_double_chest() {
    let fx = Fixture::new();
    let (left, right) = double_chest(&fx);
    fx.place(right.above(), fx.palette.stone);

    assert_eq!(
        chest::resolve(&fx.registry, &fx.world, left),
        CombineResult::NoCombination
    );
    assert_eq!(use_block(&fx.registry, &fx.world, left, None), InteractionResult::Consume);
}

#[test]
fn water_on_the_lid_does_not_block() {
    let fx = Fixture::new();
    fx.place(ORIGIN, fx.palette.chest);
    fx.place(ORIGIN.above(), fx.palette.water);

    assert!(!chest::is_blocked(&fx.registry, &fx.world, ORIGIN));
}

// ---------------------------------------------------------------------------
// Lids
// ---------------------------------------------------------------------------

#[test]
fn lid_opens_while_viewed_and_closes_after() {
    let fx = Fixture::new();
    let (left, right) = double_chest(&fx);
    let result = chest::resolve(&fx.registry, &fx.world, left);
    chest::start_viewing(&fx.world, &result);

    for _ in 0..3 {
        tick_aux_states(&fx.world, &fx.registry, &[left, right]);
    }
    for pos in [left, right] {
        let aux = fx.world.get_aux(pos).expect("record");
        assert_eq!(aux.viewers, 1);
        assert!((aux.openness - 0.3).abs() < 1e-5);
        assert_eq!(aux.age, 3);
    }

    for _ in 0..20 {
        tick_aux_states(&fx.world, &fx.registry, &[left]);
    }
    assert_eq!(fx.world.get_aux(left).expect("record").openness, 1.0);

    chest::stop_viewing(&fx.world, &result);
    for _ in 0..20 {
        tick_aux_states(&fx.world, &fx.registry, &[left]);
    }
    let aux = fx.world.get_aux(left).expect("record");
    assert_eq!(aux.viewers, 0);
    assert_eq!(aux.openness, 0.0);
}

#[test]
fn stop_viewing_never_underflows() {
    let fx = Fixture::new();
    fx.place(ORIGIN, fx.palette.chest);
    let result = chest::resolve(&fx.registry, &fx.world, ORIGIN);
    chest::stop_viewing(&fx.world, &result);

    assert_eq!(fx.world.get_aux(ORIGIN).expect("record").viewers, 0);
}

// ---------------------------------------------------------------------------
// Shape and waterlogging
// ---------------------------------------------------------------------------

#[test]
fn double_chest_halves_reach_toward_each_other() {
    let fx = Fixture::new();
    let (left, right) = double_chest(&fx);

    let left_cell = fx.registry.cell_at(&fx.world, left);
    let Shape::Boxes(boxes) = behavior::shape(&left_cell, &fx.world) else {
        panic!("chests have a box shape");
    };
    assert_eq!(boxes.len(), 1);
    assert_eq!(boxes[0].max[0], 1.0);
    assert_eq!(boxes[0].min[0], 1.0 / 16.0);

    let right_cell = fx.registry.cell_at(&fx.world, right);
    let Shape::Boxes(boxes) = behavior::shape(&right_cell, &fx.world) else {
        panic!("chests have a box shape");
    };
    assert_eq!(boxes[0].min[0], 0.0);
    assert!(!behavior::shape(&right_cell, &fx.world).is_full());
}

#[test]
fn water_fills_a_chest_without_unpairing_it() {
    let fx = Fixture::new();
    let (left, right) = double_chest(&fx);

    assert!(waterlog::pour_water(&fx.world, &fx.registry, right));
    let cell = fx.registry.cell_at(&fx.world, right);
    assert_eq!(cell.flag(waterlog::WATERLOGGED), Some(true));
    assert_eq!(cell.value("type"), Some("right"));
    assert!(fx.world.get_aux(right).is_some());
    assert!(chest::resolve(&fx.registry, &fx.world, left).is_combined());

    // Already full.
    assert!(!waterlog::pour_water(&fx.world, &fx.registry, right));
}

#[test]
fn water_replaces_air_but_not_stone() {
    let fx = Fixture::new();
    let air = ORIGIN.above();

    assert!(waterlog::pour_water(&fx.world, &fx.registry, air));
    assert_eq!(fx.name_at(air), "water");
    assert!(!waterlog::pour_water(&fx.world, &fx.registry, ORIGIN.below()));
    assert_eq!(fx.name_at(ORIGIN.below()), "stone");
}

#[test]
fn pouring_onto_a_source_changes_nothing() {
    let fx = Fixture::new();
    let pos = ORIGIN.above();
    fx.world.set_block(pos, fx.state("water", &[("level", "3")]));

    // Flowing water becomes a source, which then stays as it is.
    assert!(waterlog::pour_water(&fx.world, &fx.registry, pos));
    assert_eq!(fx.value_at(pos, "level"), Some("0"));
    assert!(!waterlog::pour_water(&fx.world, &fx.registry, pos));
}

#[test]
fn flowing_water_does_not_fill_a_chest() {
    let fx = Fixture::new();
    fx.place(ORIGIN, fx.palette.chest);
    let cell = fx.registry.cell_at(&fx.world, ORIGIN);
    let liquid = fx.registry.liquid_container(&cell).expect("chests hold water");
    let flowing = FluidState {
        kind: FluidKind::Water,
        level: 3,
    };

    assert!(!liquid.accept_fluid(&fx.world, &cell, flowing));
    assert_eq!(fx.value_at(ORIGIN, "waterlogged"), Some("false"));
    assert!(liquid.accept_fluid(&fx.world, &cell, FluidState::source(FluidKind::Water)));
    assert_eq!(fx.value_at(ORIGIN, "waterlogged"), Some("true"));
}
