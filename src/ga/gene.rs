//! Per-group permutation gene.
//!
//! # Encoding
//!
//! A gene maps each of a group's `T` week positions to a distinct offset
//! into that group's lesson-pool sub-range. It is always a permutation of
//! `[0, T)`, so mutation and crossover reorder a group's lessons but never
//! add or drop one.
//!
//! # Construction
//!
//! Lab subjects (`*_lab`) are placed first as contiguous blocks that stay
//! within one day and do not straddle lunch. When no such run is open the
//! block falls back to any contiguous run of free positions, and then to
//! scattered positions. Remaining lessons fill the rest in random order.

use rand::seq::{IndexedRandom, SliceRandom};
use rand::Rng;
use tracing::trace;

use crate::models::{is_lab_subject, LessonPool, WeekLayout};

/// One group's placement of lessons onto week positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleGene {
    group: usize,
    /// Position → group-local pool offset.
    offsets: Vec<usize>,
}

impl ScheduleGene {
    /// Creates the identity placement (`position == offset`).
    pub fn identity(group: usize, slots_per_week: usize) -> Self {
        Self {
            group,
            offsets: (0..slots_per_week).collect(),
        }
    }

    /// Creates a gene from explicit offsets.
    ///
    /// Returns `None` unless `offsets` is a permutation of `[0, len)`.
    pub fn from_offsets(group: usize, offsets: Vec<usize>) -> Option<Self> {
        let gene = Self { group, offsets };
        gene.is_permutation().then_some(gene)
    }

    /// Creates a random gene for `group`, honouring lab blocks where possible.
    pub fn random<R: Rng>(
        pool: &LessonPool,
        layout: &WeekLayout,
        group: usize,
        rng: &mut R,
    ) -> Self {
        let slots = pool.slots_per_week();
        let lessons = pool.group_lessons(group);

        // Offsets grouped by subject, in first-seen order.
        let mut by_subject: Vec<(Option<&str>, Vec<usize>)> = Vec::new();
        for (offset, lesson) in lessons.iter().enumerate() {
            let subject = lesson.subject();
            match by_subject.iter_mut().find(|(s, _)| *s == subject) {
                Some((_, offsets)) => offsets.push(offset),
                None => by_subject.push((subject, vec![offset])),
            }
        }

        let mut blocks: Vec<Vec<usize>> = Vec::new();
        let mut singles: Vec<usize> = Vec::new();
        for (subject, offsets) in by_subject {
            match subject {
                Some(name) if is_lab_subject(name) && !offsets.is_empty() => blocks.push(offsets),
                _ => singles.extend(offsets),
            }
        }
        blocks.shuffle(rng);
        singles.shuffle(rng);

        let mut placement: Vec<Option<usize>> = vec![None; slots];
        let mut free = vec![true; slots];

        for block in &blocks {
            let m = block.len();
            let start = find_block_start(&free, m, layout, rng).or_else(|| find_free_run(&free, m));
            match start {
                Some(start) => {
                    for (i, &offset) in block.iter().enumerate() {
                        placement[start + i] = Some(offset);
                        free[start + i] = false;
                    }
                }
                None => {
                    trace!(group, block_len = m, "no contiguous run, scattering block");
                    for &offset in block {
                        let open: Vec<usize> = (0..slots).filter(|&p| free[p]).collect();
                        let Some(&pos) = open.choose(rng) else { break };
                        placement[pos] = Some(offset);
                        free[pos] = false;
                    }
                }
            }
        }

        let mut remaining: Vec<usize> = (0..slots).filter(|&p| free[p]).collect();
        remaining.shuffle(rng);
        for (pos, offset) in remaining.into_iter().zip(singles) {
            placement[pos] = Some(offset);
        }

        // Backfill anything left so the result is total.
        let mut used = vec![false; slots];
        for &offset in placement.iter().flatten() {
            used[offset] = true;
        }
        let mut unused: Vec<usize> = (0..slots).filter(|&o| !used[o]).collect();
        unused.shuffle(rng);
        let mut unused = unused.into_iter();

        let offsets = placement
            .into_iter()
            .enumerate()
            .map(|(pos, offset)| offset.or_else(|| unused.next()).unwrap_or(pos))
            .collect();

        Self { group, offsets }
    }

    /// Group this gene schedules.
    pub fn group(&self) -> usize {
        self.group
    }

    /// Position → offset mapping.
    pub fn offsets(&self) -> &[usize] {
        &self.offsets
    }

    /// Number of week positions.
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    /// Whether the gene has no positions.
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Pool offset scheduled at a week position.
    pub fn offset_at(&self, position: usize) -> Option<usize> {
        self.offsets.get(position).copied()
    }

    /// Whether the mapping is a bijection over `[0, T)`.
    pub fn is_permutation(&self) -> bool {
        let mut seen = vec![false; self.offsets.len()];
        for &o in &self.offsets {
            match seen.get_mut(o) {
                Some(slot) if !*slot => *slot = true,
                _ => return false,
            }
        }
        true
    }

    /// Exchanges the lessons at two positions.
    pub fn swap_positions(&mut self, a: usize, b: usize) {
        if a < self.offsets.len() && b < self.offsets.len() {
            self.offsets.swap(a, b);
        }
    }

    /// Shifts every lesson one position earlier; the first wraps to the end.
    pub fn rotate_left(&mut self) {
        if !self.offsets.is_empty() {
            self.offsets.rotate_left(1);
        }
    }
}

/// Randomly probes free positions for an `m`-long run inside one day that
/// does not cross the lunch boundary.
fn find_block_start<R: Rng>(
    free: &[bool],
    m: usize,
    layout: &WeekLayout,
    rng: &mut R,
) -> Option<usize> {
    let hours = layout.hours_per_day;
    if m == 0 || m > hours {
        return None;
    }
    let lunch = layout.lunch_hour;

    let mut candidates: Vec<usize> = (0..free.len()).filter(|&p| free[p]).collect();
    candidates.shuffle(rng);

    candidates.into_iter().find(|&pos| {
        let day_hour = pos % hours;
        if day_hour > hours - m {
            return false;
        }
        let crosses_lunch = day_hour < lunch && day_hour + m > lunch;
        !crosses_lunch && (pos..pos + m).all(|q| free.get(q).copied().unwrap_or(false))
    })
}

/// First run of `m` consecutive free positions, ignoring day and lunch
/// boundaries.
fn find_free_run(free: &[bool], m: usize) -> Option<usize> {
    if m == 0 {
        return None;
    }
    let open: Vec<usize> = (0..free.len()).filter(|&p| free[p]).collect();
    open.windows(m)
        .find(|w| w[m - 1] - w[0] == m - 1)
        .map(|w| w[0])
}
