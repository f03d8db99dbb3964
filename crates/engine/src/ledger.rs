use super::*;
use bzp_core::*;
use serde::Deserialize;
use serde::Serialize;

/// The four betting moves. Wire form is the uppercase tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BetAction {
    Bet,
    Match,
    Raise,
    Fold,
}

impl std::fmt::Display for BetAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BetAction::Bet => write!(f, "BET"),
            BetAction::Match => write!(f, "MATCH"),
            BetAction::Raise => write!(f, "RAISE"),
            BetAction::Fold => write!(f, "FOLD"),
        }
    }
}

/// Per-question betting state. Reset when each betting phase opens.
///
/// Invariant: `contributions[A] + contributions[B] == pot + side_pot`
/// at all times during and after betting.
#[derive(Debug, Clone)]
pub struct Ledger {
    /// Which slot acts first this question (alternates by question parity).
    pub first_actor: Slot,
    /// Each slot's open bet amount, or none.
    pub bets: PerSlot<Option<Chips>>,
    /// Cumulative amount each slot has put in this question.
    pub contributions: PerSlot<Chips>,
    /// Raises used this question. Hard cap 1.
    pub raises: u8,
    /// Which slot must act next, or none once betting is closed.
    pub awaiting_action: Option<Slot>,
    /// Matched chips at stake for this question.
    pub pot: Chips,
    /// Unmatched all-in excess; returned to its contributor, never contested.
    pub side_pot: Chips,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(Slot::A)
    }
}

impl Ledger {
    pub fn new(first_actor: Slot) -> Self {
        Self {
            first_actor,
            bets: PerSlot::default(),
            contributions: PerSlot::default(),
            raises: 0,
            awaiting_action: Some(first_actor),
            pot: 0,
            side_pot: 0,
        }
    }
    /// The open bet the given slot would be responding to.
    pub fn current_bet(&self, slot: Slot) -> Option<Chips> {
        self.bets[slot.other()]
    }
    /// Amount the slot still owes to match the opponent's contribution.
    pub fn owed(&self, slot: Slot) -> Chips {
        self.contributions[slot.other()].saturating_sub(self.contributions[slot])
    }
    /// Legal betting moves for a slot given its remaining folds.
    pub fn available_actions(&self, slot: Slot, can_fold: bool) -> Vec<BetAction> {
        let mut actions = Vec::with_capacity(4);
        if self.current_bet(slot).is_none() {
            actions.push(BetAction::Bet);
        } else {
            actions.push(BetAction::Match);
            if self.raises < 1 {
                actions.push(BetAction::Raise);
            }
        }
        if can_fold {
            actions.push(BetAction::Fold);
        }
        actions
    }
    /// Close betting: split the contributions into a matched main pot and
    /// the unmatched side pot owed back to the larger contributor.
    pub fn settle_pots(&mut self) {
        let a = self.contributions[Slot::A];
        let b = self.contributions[Slot::B];
        self.pot = 2 * a.min(b);
        self.side_pot = a.abs_diff(b);
        self.awaiting_action = None;
    }
    /// Owner of the side pot: whichever slot contributed more.
    pub fn side_owner(&self) -> Option<Slot> {
        if self.side_pot == 0 {
            None
        } else if self.contributions[Slot::A] > self.contributions[Slot::B] {
            Some(Slot::A)
        } else {
            Some(Slot::B)
        }
    }
    /// Contribution accounting invariant; a violation is fatal to the match.
    pub fn balanced(&self) -> bool {
        self.contributions[Slot::A] + self.contributions[Slot::B] == self.pot + self.side_pot
    }
}

/// The bet amounts a slot may choose from: the fixed tiers it can afford,
/// plus its exact balance when not already present, so an exact all-in is
/// always on the menu.
pub fn bet_menu(tiers: &[Chips], balance: Chips) -> Vec<Chips> {
    let mut menu: Vec<Chips> = tiers.iter().copied().filter(|&t| t <= balance).collect();
    if balance > 0 && !menu.contains(&balance) {
        menu.push(balance);
    }
    menu
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn menu_appends_exact_all_in() {
        let tiers = [5, 10, 25, 50, 100];
        assert_eq!(bet_menu(&tiers, 450), vec![5, 10, 25, 50, 100, 450]);
        assert_eq!(bet_menu(&tiers, 100), vec![5, 10, 25, 50, 100]);
        assert_eq!(bet_menu(&tiers, 3), vec![3]);
        assert!(bet_menu(&tiers, 0).is_empty());
    }
    #[test]
    fn first_actor_opens_with_bet() {
        let ledger = Ledger::new(Slot::A);
        assert_eq!(
            ledger.available_actions(Slot::A, true),
            vec![BetAction::Bet, BetAction::Fold]
        );
        assert_eq!(ledger.available_actions(Slot::A, false), vec![BetAction::Bet]);
    }
    #[test]
    fn responder_matches_or_raises() {
        let mut ledger = Ledger::new(Slot::A);
        ledger.bets[Slot::A] = Some(50);
        ledger.contributions[Slot::A] = 50;
        ledger.pot = 50;
        assert_eq!(
            ledger.available_actions(Slot::B, true),
            vec![BetAction::Match, BetAction::Raise, BetAction::Fold]
        );
        ledger.raises = 1;
        assert_eq!(
            ledger.available_actions(Slot::B, true),
            vec![BetAction::Match, BetAction::Fold]
        );
    }
    #[test]
    fn settle_splits_unmatched_excess() {
        let mut ledger = Ledger::new(Slot::A);
        ledger.contributions[Slot::A] = 500;
        ledger.contributions[Slot::B] = 450;
        ledger.settle_pots();
        assert_eq!(ledger.pot, 900);
        assert_eq!(ledger.side_pot, 50);
        assert_eq!(ledger.side_owner(), Some(Slot::A));
        assert!(ledger.balanced());
    }
    #[test]
    fn settle_even_contributions_has_no_side_pot() {
        let mut ledger = Ledger::new(Slot::B);
        ledger.contributions[Slot::A] = 100;
        ledger.contributions[Slot::B] = 100;
        ledger.settle_pots();
        assert_eq!(ledger.pot, 200);
        assert_eq!(ledger.side_pot, 0);
        assert_eq!(ledger.side_owner(), None);
        assert!(ledger.balanced());
    }
}
