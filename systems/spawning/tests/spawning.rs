use autobattler_board::{query, BoardManager};
use autobattler_core::{Authority, HexCoord, LedgerError, UnitId, UnitStats};
use autobattler_system_spawning::{Config, UnitSpawner};

#[test]
fn spawned_units_receive_sequential_identifiers() {
    let mut board = BoardManager::new();
    let mut spawner = UnitSpawner::default();

    let first = spawner
        .spawn_unit(&mut board, Authority::Writer, HexCoord::new(0, 4), UnitStats::default())
        .expect("free deploy cell");
    let second = spawner
        .spawn_unit(&mut board, Authority::Writer, HexCoord::new(1, 4), UnitStats::default())
        .expect("free deploy cell");

    assert_eq!(first.id(), UnitId::new(1));
    assert_eq!(second.id(), UnitId::new(2));
    assert_eq!(first.cell(), Some(HexCoord::new(0, 4)));
    assert_eq!(board.occupant(HexCoord::new(1, 4)), Some(UnitId::new(2)));
}

#[test]
fn spawned_unit_starts_with_full_health_and_no_engagement() {
    let mut board = BoardManager::new();
    let mut spawner = UnitSpawner::new(Config::new(40));
    let stats = UnitStats {
        max_hp: 320,
        attack_range: 0,
        ..UnitStats::default()
    };

    let unit = spawner
        .spawn_unit(&mut board, Authority::Writer, HexCoord::new(6, 7), stats)
        .expect("free deploy cell");

    assert_eq!(unit.id(), UnitId::new(40));
    assert_eq!(unit.stats().attack_range, 1);
    assert_eq!(unit.combat().hp(), 320);
    assert_eq!(unit.combat().mana(), 0);
    assert_eq!(unit.combat().target(), None);
    assert_eq!(unit.destination(), None);
}

#[test]
fn failed_placement_burns_identifier() {
    let mut board = BoardManager::new();
    let mut spawner = UnitSpawner::default();
    let _ = spawner
        .spawn_unit(&mut board, Authority::Writer, HexCoord::new(3, 5), UnitStats::default())
        .expect("free deploy cell");
    let before = query::snapshot(&board);

    let occupied = spawner.spawn_unit(
        &mut board,
        Authority::Writer,
        HexCoord::new(3, 5),
        UnitStats::default(),
    );
    let outside_zone = spawner.spawn_unit(
        &mut board,
        Authority::Writer,
        HexCoord::new(3, 1),
        UnitStats::default(),
    );

    assert_eq!(
        occupied.map(|unit| unit.id()),
        Err(LedgerError::Occupied {
            cell: HexCoord::new(3, 5),
            occupant: UnitId::new(1),
        })
    );
    assert_eq!(
        outside_zone.map(|unit| unit.id()),
        Err(LedgerError::InvalidTarget {
            cell: HexCoord::new(3, 1)
        })
    );
    assert_eq!(query::snapshot(&board), before);
    assert_eq!(spawner.peek_next_id(), UnitId::new(4));
}

#[test]
fn observers_cannot_spawn() {
    let mut board = BoardManager::new();
    let mut spawner = UnitSpawner::default();

    let outcome = spawner.spawn_unit(
        &mut board,
        Authority::Observer,
        HexCoord::new(0, 7),
        UnitStats::default(),
    );

    assert_eq!(outcome.map(|unit| unit.id()), Err(LedgerError::NotAuthorized));
    assert_eq!(spawner.peek_next_id(), UnitId::new(1));
    assert!(board.is_empty());
}
