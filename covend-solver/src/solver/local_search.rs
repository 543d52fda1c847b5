//! Best-improvement local search over a feasible plan.
//!
//! Each iteration scans every 2-opt, relocate and swap move, applies the one
//! with the most negative distance change and repeats until no move improves,
//! the iteration cap is hit or the quota runs out. Capacity is checked before
//! a move is scored so the plan stays feasible throughout.

use covend_core::{ProblemInstance, Quota};

use super::plan::{Delta, Plan, arc, demand_of, stop_in};

/// A neighbourhood move. Positions index the customer sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Move {
    /// Reverse customers `first..=last` of one route.
    TwoOpt {
        vehicle: usize,
        first: usize,
        last: usize,
    },
    /// Move one customer to another route.
    Relocate {
        from: usize,
        position: usize,
        to: usize,
        at: usize,
    },
    /// Exchange one customer of `left` with one of `right`.
    Swap {
        left: usize,
        left_pos: usize,
        right: usize,
        right_pos: usize,
    },
}

/// Why the search stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Stop {
    /// No improving move remains.
    LocalOptimum,
    /// The iteration cap was reached.
    IterationLimit,
    /// The quota ran out.
    QuotaReached,
}

/// Outcome of [`improve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Summary {
    pub(crate) moves: usize,
    pub(crate) stop: Stop,
}

/// Improve `plan` in place.
pub(crate) fn improve(
    instance: &ProblemInstance,
    plan: &mut Plan,
    max_iterations: usize,
    quota: &dyn Quota,
) -> Summary {
    let mut moves = 0;
    let stop = loop {
        if moves >= max_iterations {
            break Stop::IterationLimit;
        }
        if quota.is_reached() {
            break Stop::QuotaReached;
        }
        let Some((delta, candidate)) = best_move(instance, plan) else {
            break Stop::LocalOptimum;
        };
        log::trace!("applying {candidate:?} saving {}", -delta);
        apply(instance, plan, candidate);
        moves += 1;
    };
    Summary { moves, stop }
}

/// Most improving move, if any strictly improves.
fn best_move(instance: &ProblemInstance, plan: &Plan) -> Option<(Delta, Move)> {
    let mut best: Option<(Delta, Move)> = None;
    let mut offer = |delta: Delta, candidate: Move| {
        if delta < 0 && best.is_none_or(|(known, _)| delta < known) {
            best = Some((delta, candidate));
        }
    };
    scan_two_opt(instance, plan, &mut offer);
    scan_relocate(instance, plan, &mut offer);
    scan_swap(instance, plan, &mut offer);
    best
}

fn scan_two_opt(instance: &ProblemInstance, plan: &Plan, offer: &mut impl FnMut(Delta, Move)) {
    for vehicle in 0..plan.routes.len() {
        let route = plan.route(vehicle);
        for first in 0..route.len() {
            for last in first + 1..route.len() {
                offer(
                    two_opt_delta(instance, route, first, last),
                    Move::TwoOpt {
                        vehicle,
                        first,
                        last,
                    },
                );
            }
        }
    }
}

/// Cost change of reversing `first..=last`, valid for asymmetric matrices.
fn two_opt_delta(instance: &ProblemInstance, route: &[usize], first: usize, last: usize) -> Delta {
    let at = |pos: usize| stop_in(route, pos + 1);
    let before = stop_in(route, first);
    let after = stop_in(route, last + 2);
    let mut old = arc(instance, before, at(first)) + arc(instance, at(last), after);
    let mut new = arc(instance, before, at(last)) + arc(instance, at(first), after);
    for pos in first..last {
        old += arc(instance, at(pos), at(pos + 1));
        new += arc(instance, at(pos + 1), at(pos));
    }
    new - old
}

fn scan_relocate(instance: &ProblemInstance, plan: &Plan, offer: &mut impl FnMut(Delta, Move)) {
    let vehicles = plan.routes.len();
    for from in 0..vehicles {
        for position in 0..plan.route(from).len() {
            let point = plan.stop(from, position + 1);
            let demand = demand_of(instance, point);
            let removal = arc(
                instance,
                plan.stop(from, position),
                plan.stop(from, position + 2),
            ) - arc(instance, plan.stop(from, position), point)
                - arc(instance, point, plan.stop(from, position + 2));
            for to in (0..vehicles).filter(|&to| to != from) {
                if !plan.fits(to, demand) {
                    continue;
                }
                for at in 0..=plan.route(to).len() {
                    let prev = plan.stop(to, at);
                    let next = plan.stop(to, at + 1);
                    let insertion = arc(instance, prev, point) + arc(instance, point, next)
                        - arc(instance, prev, next);
                    offer(
                        removal + insertion,
                        Move::Relocate {
                            from,
                            position,
                            to,
                            at,
                        },
                    );
                }
            }
        }
    }
}

fn scan_swap(instance: &ProblemInstance, plan: &Plan, offer: &mut impl FnMut(Delta, Move)) {
    let vehicles = plan.routes.len();
    for left in 0..vehicles {
        for right in left + 1..vehicles {
            for left_pos in 0..plan.route(left).len() {
                for right_pos in 0..plan.route(right).len() {
                    let x = plan.stop(left, left_pos + 1);
                    let y = plan.stop(right, right_pos + 1);
                    let (dx, dy) = (demand_of(instance, x), demand_of(instance, y));
                    let left_ok = plan.load(left) - dx + dy <= plan.capacity(left);
                    let right_ok = plan.load(right) - dy + dx <= plan.capacity(right);
                    if !(left_ok && right_ok) {
                        continue;
                    }
                    let delta = replace_delta(instance, plan, left, left_pos, y)
                        + replace_delta(instance, plan, right, right_pos, x);
                    offer(
                        delta,
                        Move::Swap {
                            left,
                            left_pos,
                            right,
                            right_pos,
                        },
                    );
                }
            }
        }
    }
}

/// Cost change of putting `point` in place of the customer at `position`.
fn replace_delta(
    instance: &ProblemInstance,
    plan: &Plan,
    vehicle: usize,
    position: usize,
    point: usize,
) -> Delta {
    let prev = plan.stop(vehicle, position);
    let old = plan.stop(vehicle, position + 1);
    let next = plan.stop(vehicle, position + 2);
    arc(instance, prev, point) + arc(instance, point, next)
        - arc(instance, prev, old)
        - arc(instance, old, next)
}

fn apply(instance: &ProblemInstance, plan: &mut Plan, candidate: Move) {
    match candidate {
        Move::TwoOpt {
            vehicle,
            first,
            last,
        } => {
            if let Some(segment) = plan
                .routes
                .get_mut(vehicle)
                .and_then(|route| route.get_mut(first..=last))
            {
                segment.reverse();
            }
        }
        Move::Relocate {
            from,
            position,
            to,
            at,
        } => {
            let point = plan.stop(from, position + 1);
            let demand = demand_of(instance, point);
            if plan.remove(from, position, demand).is_some() {
                plan.insert(to, at, point, demand);
            }
        }
        Move::Swap {
            left,
            left_pos,
            right,
            right_pos,
        } => {
            let x = plan.stop(left, left_pos + 1);
            let y = plan.stop(right, right_pos + 1);
            let (dx, dy) = (demand_of(instance, x), demand_of(instance, y));
            if plan.remove(left, left_pos, dx).is_some() && plan.remove(right, right_pos, dy).is_some()
            {
                plan.insert(left, left_pos, y, dy);
                plan.insert(right, right_pos, x, dx);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use covend_core::test_support::{ExhaustedQuota, euclidean_instance};
    use covend_core::{DistanceMatrix, Unlimited};
    use rstest::rstest;

    fn plan_with(instance: &ProblemInstance, routes: &[&[usize]]) -> Plan {
        let mut plan = Plan::empty(instance);
        for (vehicle, customers) in routes.iter().enumerate() {
            for (pos, &point) in customers.iter().enumerate() {
                plan.insert(vehicle, pos, point, demand_of(instance, point));
            }
        }
        plan
    }

    #[rstest]
    fn two_opt_untangles_crossing() {
        // Square visited in a crossing order.
        let instance = euclidean_instance(
            &[(0, 0), (0, 10), (10, 0), (10, 10)],
            vec![0, 1, 1, 1],
            1,
            10,
        )
        .expect("instance");
        let mut plan = plan_with(&instance, &[&[1, 2, 3]]);
        let before = plan.distance(&instance);
        let summary = improve(&instance, &mut plan, 100, &Unlimited);
        assert!(summary.moves >= 1);
        assert_eq!(summary.stop, Stop::LocalOptimum);
        assert!(plan.distance(&instance) < before);
        assert_eq!(plan.distance(&instance), 40);
    }

    #[rstest]
    fn two_opt_delta_respects_direction() {
        let matrix = DistanceMatrix::from_rows(vec![
            vec![0, 1, 100],
            vec![100, 0, 1],
            vec![1, 100, 0],
        ])
        .expect("matrix");
        let instance = ProblemInstance::with_uniform_fleet(matrix, vec![0, 1, 1], 1, 5)
            .expect("instance");
        // 0 -> 1 -> 2 -> 0 costs 3; reversing costs 300.
        assert_eq!(two_opt_delta(&instance, &[1, 2], 0, 1), 297);
        assert_eq!(two_opt_delta(&instance, &[2, 1], 0, 1), -297);
    }

    #[rstest]
    fn relocate_respects_capacity() {
        let instance = euclidean_instance(
            &[(0, 0), (10, 0), (11, 0), (-10, 0)],
            vec![0, 5, 5, 5],
            2,
            10,
        )
        .expect("instance");
        // Point 2 would rather join point 1 but vehicle 0 is full.
        let mut plan = plan_with(&instance, &[&[1, 3], &[2]]);
        improve(&instance, &mut plan, 100, &Unlimited);
        for vehicle in 0..2 {
            assert!(plan.load(vehicle) <= plan.capacity(vehicle));
        }
        assert_eq!(plan.routes.iter().map(Vec::len).sum::<usize>(), 3);
    }

    #[rstest]
    fn swap_exchanges_misplaced_customers() {
        let instance = euclidean_instance(
            &[(0, 0), (100, 0), (101, 0), (-100, 0), (-101, 0)],
            vec![0, 5, 5, 5, 5],
            2,
            10,
        )
        .expect("instance");
        let mut plan = plan_with(&instance, &[&[1, 3], &[2, 4]]);
        improve(&instance, &mut plan, 100, &Unlimited);
        assert_eq!(plan.distance(&instance), 404);
    }

    #[rstest]
    fn stops_at_iteration_limit() {
        let instance = euclidean_instance(
            &[(0, 0), (0, 10), (10, 0), (10, 10)],
            vec![0, 1, 1, 1],
            1,
            10,
        )
        .expect("instance");
        let mut plan = plan_with(&instance, &[&[1, 2, 3]]);
        let summary = improve(&instance, &mut plan, 0, &Unlimited);
        assert_eq!(summary, Summary { moves: 0, stop: Stop::IterationLimit });
    }

    #[rstest]
    fn stops_when_quota_reached() {
        let instance = euclidean_instance(
            &[(0, 0), (0, 10), (10, 0), (10, 10)],
            vec![0, 1, 1, 1],
            1,
            10,
        )
        .expect("instance");
        let mut plan = plan_with(&instance, &[&[1, 2, 3]]);
        let untouched = plan.clone();
        let summary = improve(&instance, &mut plan, 100, &ExhaustedQuota);
        assert_eq!(summary.stop, Stop::QuotaReached);
        assert_eq!(plan, untouched);
    }
}
