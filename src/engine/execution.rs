use crate::portfolio::Account;
use serde::{Deserialize, Serialize};
use tracing::debug;

//order side (buy or sell)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderSide {
    Buy,
    Sell,
}

//an executed all-in or all-out trade
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fill {
    //bar index the trade happened on
    pub index: usize,
    pub side: OrderSide,
    pub price: f64,

    //shares bought or sold
    pub shares: f64,

    //cash spent or raised
    pub value: f64,
}

//executes a market order for the whole account at the bar's close
//returns none when the account has nothing to trade on that side
pub fn execute(account: &mut Account, side: OrderSide, index: usize, price: f64) -> Option<Fill> {
    let fill = match side {
        OrderSide::Buy => {
            let value = account.cash;
            let shares = account.buy_all(price)?;
            Fill {
                index,
                side,
                price,
                shares,
                value,
            }
        }
        OrderSide::Sell => {
            let shares = account.shares;
            let value = account.sell_all(price)?;
            Fill {
                index,
                side,
                price,
                shares,
                value,
            }
        }
    };

    debug!(index, ?side, price, shares = fill.shares, value = fill.value, "filled order");
    Some(fill)
}
