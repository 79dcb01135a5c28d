//! # Reaction Ledger
//!
//! Pure like/unlike state machine over a post's liked set. The derived
//! `likes` counter is always recomputed from the set length, so the pair
//! cannot drift apart. Persistence is the repo's concern; this module
//! never does I/O.

use uuid::Uuid;
use crate::error::{AppError, Result};

/// Wire flag values accepted from clients.
const FLAG_UNLIKE: i64 = 0;
const FLAG_LIKE: i64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaction {
    Like,
    Unlike,
}

impl Reaction {
    /// Decodes the two-valued wire discriminator. Anything outside {0, 1}
    /// is rejected without touching post state.
    pub fn from_flag(flag: i64) -> Result<Self> {
        match flag {
            FLAG_LIKE => Ok(Reaction::Like),
            FLAG_UNLIKE => Ok(Reaction::Unlike),
            other => Err(AppError::InvalidReaction(other)),
        }
    }
}

/// Applies one transition for `(post, actor)` and returns the new liked set.
///
/// Liking an already-liked post and unliking a never-liked post are both
/// rejected no-ops, which keeps a double like from double-counting.
pub fn apply(users_liked: &[Uuid], actor_id: Uuid, reaction: Reaction) -> Result<Vec<Uuid>> {
    let already = users_liked.contains(&actor_id);
    match reaction {
        Reaction::Like => {
            if already {
                return Err(AppError::AlreadyLiked);
            }
            let mut next = users_liked.to_vec();
            next.push(actor_id);
            Ok(next)
        }
        Reaction::Unlike => {
            if !already {
                return Err(AppError::NothingToRemove);
            }
            Ok(users_liked.iter().copied().filter(|id| *id != actor_id).collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_decoding() {
        assert_eq!(Reaction::from_flag(1).unwrap(), Reaction::Like);
        assert_eq!(Reaction::from_flag(0).unwrap(), Reaction::Unlike);
        assert!(matches!(
            Reaction::from_flag(-1),
            Err(AppError::InvalidReaction(-1))
        ));
        assert!(matches!(
            Reaction::from_flag(2),
            Err(AppError::InvalidReaction(2))
        ));
    }

    #[test]
    fn like_adds_actor_once() {
        let a = Uuid::now_v7();
        let liked = apply(&[], a, Reaction::Like).unwrap();
        assert_eq!(liked, vec![a]);

        let err = apply(&liked, a, Reaction::Like).unwrap_err();
        assert!(matches!(err, AppError::AlreadyLiked));
    }

    #[test]
    fn unlike_requires_prior_like() {
        let a = Uuid::now_v7();
        let err = apply(&[], a, Reaction::Unlike).unwrap_err();
        assert!(matches!(err, AppError::NothingToRemove));
    }

    #[test]
    fn like_then_unlike_round_trips() {
        let a = Uuid::now_v7();
        let b = Uuid::now_v7();
        let original = vec![b];

        let liked = apply(&original, a, Reaction::Like).unwrap();
        assert_eq!(liked.len(), 2);

        let back = apply(&liked, a, Reaction::Unlike).unwrap();
        assert_eq!(back, original);
    }

    #[test]
    fn unlike_only_removes_the_actor() {
        let a = Uuid::now_v7();
        let b = Uuid::now_v7();
        let c = Uuid::now_v7();
        let next = apply(&[a, b, c], b, Reaction::Unlike).unwrap();
        assert_eq!(next, vec![a, c]);
    }
}
