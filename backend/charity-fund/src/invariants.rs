#![allow(dead_code)]

use crate::models::Fundable;

/// INV-1: invested amount stays within `0..=full_amount`.
pub fn assert_invested_within_bounds<T: Fundable>(entity: &T) {
    assert!(
        entity.invested_amount() >= 0 && entity.invested_amount() <= entity.full_amount(),
        "INV-1 violated: entity {} has invested {} of {}",
        entity.id(),
        entity.invested_amount(),
        entity.full_amount()
    );
}

/// INV-2: `fully_invested`, a set `close_date`, and `invested == full` all
/// hold together or not at all.
pub fn assert_closure_consistent<T: Fundable>(entity: &T) {
    let filled = entity.invested_amount() == entity.full_amount();
    assert_eq!(
        entity.fully_invested(),
        filled,
        "INV-2 violated: entity {} fully_invested={} but invested {} of {}",
        entity.id(),
        entity.fully_invested(),
        entity.invested_amount(),
        entity.full_amount()
    );
    assert_eq!(
        entity.close_date().is_some(),
        filled,
        "INV-2 violated: entity {} close_date={:?} but invested {} of {}",
        entity.id(),
        entity.close_date(),
        entity.invested_amount(),
        entity.full_amount()
    );
}

/// INV-3: a close date is never earlier than the creation date.
pub fn assert_closed_after_created<T: Fundable>(entity: &T) {
    if let Some(closed) = entity.close_date() {
        assert!(
            closed >= entity.create_date(),
            "INV-3 violated: entity {} closed at {} before creation at {}",
            entity.id(),
            closed,
            entity.create_date()
        );
    }
}

/// INV-4: money moved into projects equals money drawn from donations.
pub fn assert_conservation<P: Fundable, D: Fundable>(
    projects_before: &[P],
    projects_after: &[P],
    donations_before: &[D],
    donations_after: &[D],
) {
    let invested = total_invested(projects_after) - total_invested(projects_before);
    let drawn = total_invested(donations_after) - total_invested(donations_before);
    assert_eq!(
        invested, drawn,
        "INV-4 violated: projects gained {invested} but donations gave {drawn}"
    );
}

/// INV-5: at most one entity per pool is left partially funded.
pub fn assert_at_most_one_partial<T: Fundable>(pool: &[T]) {
    let partial = pool
        .iter()
        .filter(|e| e.invested_amount() > 0 && e.is_open())
        .count();
    assert!(
        partial <= 1,
        "INV-5 violated: {partial} partially funded entities in one pool"
    );
}

/// INV-6: entities past the touched prefix are unchanged.
pub fn assert_untouched_after<T: Fundable + PartialEq + std::fmt::Debug>(
    before: &[T],
    after: &[T],
    touched: usize,
) {
    assert_eq!(
        &before[touched..],
        &after[touched..],
        "INV-6 violated: entities after position {touched} were mutated"
    );
}

fn total_invested<T: Fundable>(pool: &[T]) -> i64 {
    pool.iter().map(Fundable::invested_amount).sum()
}

/// Run all per-entity invariants over a pool.
pub fn assert_all_fundable_invariants<T: Fundable>(pool: &[T]) {
    for entity in pool {
        assert_invested_within_bounds(entity);
        assert_closure_consistent(entity);
        assert_closed_after_created(entity);
    }
}
