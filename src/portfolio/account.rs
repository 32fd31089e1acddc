use serde::{Deserialize, Serialize};

//all-in / all-out cash account for a single security
//cash and shares are never both positive once a trade has happened
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Account {
    //starting capital, fixed for the run
    pub initial_investment: f64,

    //uninvested cash
    pub cash: f64,

    //shares held (fractional)
    pub shares: f64,
}

impl Account {
    //creates an account holding the whole investment in cash
    pub fn new(initial_investment: f64) -> Self {
        Account {
            initial_investment,
            cash: initial_investment,
            shares: 0.0,
        }
    }

    //returns true while holding shares
    pub fn is_invested(&self) -> bool {
        self.shares > 0.0
    }

    //converts all cash into shares at the given price
    //returns the number of shares bought, none if there was no cash
    pub fn buy_all(&mut self, price: f64) -> Option<f64> {
        if self.cash <= 0.0 {
            return None;
        }

        self.shares = self.cash / price;
        self.cash = 0.0;
        Some(self.shares)
    }

    //converts all shares into cash at the given price
    //returns the cash raised, none if nothing was held
    pub fn sell_all(&mut self, price: f64) -> Option<f64> {
        if self.shares <= 0.0 {
            return None;
        }

        self.cash = self.shares * price;
        self.shares = 0.0;
        Some(self.cash)
    }

    //mark-to-market value at the given price
    pub fn value(&self, price: f64) -> f64 {
        self.cash + self.shares * price
    }

    //fractional return of a value relative to the initial investment
    pub fn return_on(&self, value: f64) -> f64 {
        value / self.initial_investment - 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn starts_fully_in_cash() {
        let account = Account::new(1000.0);
        assert_eq!(account.cash, 1000.0);
        assert_eq!(account.shares, 0.0);
        assert!(!account.is_invested());
    }

    #[test]
    fn buy_then_sell_round_trip() {
        let mut account = Account::new(1000.0);

        assert_eq!(account.buy_all(10.0), Some(100.0));
        assert_eq!(account.cash, 0.0);
        assert!(account.is_invested());
        assert_relative_eq!(account.value(12.0), 1200.0);

        assert_eq!(account.sell_all(12.0), Some(1200.0));
        assert_eq!(account.shares, 0.0);
        assert_relative_eq!(account.return_on(account.cash), 0.2);
    }

    #[test]
    fn repeated_buy_is_ignored() {
        let mut account = Account::new(1000.0);
        account.buy_all(10.0);
        assert_eq!(account.buy_all(5.0), None);
        assert_eq!(account.shares, 100.0);
    }

    #[test]
    fn sell_without_shares_is_ignored() {
        let mut account = Account::new(1000.0);
        assert_eq!(account.sell_all(10.0), None);
        assert_eq!(account.cash, 1000.0);
    }
}
