use csv::WriterBuilder;
use log::{debug, error};
use serde::{Deserialize, Serialize};
use std::io;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TicketMachineError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// A machine selling tickets at a fixed price.
///
/// Money inserted accumulates in `balance` until a ticket is printed or the
/// balance is refunded. `total` only grows when a ticket is printed.
#[derive(Debug, Serialize)]
pub struct TicketMachine {
    price: i64,
    balance: i64,
    total: i64,
}

impl TicketMachine {
    pub fn new(price: i64) -> Result<Self, TicketMachineError> {
        if price <= 0 {
            return Err(TicketMachineError::InvalidArgument(format!(
                "price must be positive, got {}",
                price
            )));
        }
        Ok(TicketMachine {
            price,
            balance: 0,
            total: 0,
        })
    }

    pub fn price(&self) -> i64 {
        self.price
    }

    pub fn balance(&self) -> i64 {
        self.balance
    }

    pub fn total(&self) -> i64 {
        self.total
    }

    pub fn insert_money(&mut self, amount: i64) -> Result<(), TicketMachineError> {
        if amount <= 0 {
            return Err(TicketMachineError::InvalidArgument(format!(
                "amount must be positive, got {}",
                amount
            )));
        }
        self.balance = self.balance.checked_add(amount).ok_or_else(|| {
            TicketMachineError::InvalidArgument(format!(
                "amount would overflow the balance, got {}",
                amount
            ))
        })?;
        debug!("inserted {}, balance is now {}", amount, self.balance);
        Ok(())
    }

    /// Prints a ticket if the balance covers the price.
    ///
    /// Returns `false` and leaves the machine untouched otherwise.
    pub fn print_ticket(&mut self) -> bool {
        if self.balance < self.price {
            debug!(
                "balance {} does not cover price {}, no ticket printed",
                self.balance, self.price
            );
            return false;
        }
        self.balance -= self.price;
        self.total = self.total.saturating_add(self.price);
        debug!("ticket printed, balance {} total {}", self.balance, self.total);
        true
    }

    /// Hands back the whole balance and returns how much was refunded.
    pub fn refund(&mut self) -> i64 {
        let refunded = std::mem::take(&mut self.balance);
        debug!("refunded {}", refunded);
        refunded
    }

    pub fn apply(&mut self, operation: Operation) -> Outcome {
        match operation.op {
            Op::Insert => {
                let result = match operation.amount {
                    Some(amount) => self.insert_money(amount),
                    None => Err(TicketMachineError::InvalidArgument(
                        "insert requires an amount".to_string(),
                    )),
                };
                match result {
                    Ok(()) => Outcome::Inserted,
                    Err(err) => {
                        error!("operation '{:?}' is not valid: {}", operation, err);
                        Outcome::Rejected
                    }
                }
            }
            Op::Print => Outcome::Printed(self.print_ticket()),
            Op::Refund => Outcome::Refunded(self.refund()),
        }
    }

    pub fn consume(&mut self, operations: impl Iterator<Item = Operation>) {
        for operation in operations {
            self.apply(operation);
        }
    }

    pub fn write_results<T: io::Write>(&self, target: T) -> csv::Result<()> {
        let mut writer = WriterBuilder::new().from_writer(target);
        writer.serialize(self)?;
        writer.flush()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Op {
    Insert,
    Print,
    Refund,
}

/// One scripted step of a replayed session.
#[derive(Debug, Clone, Deserialize)]
pub struct Operation {
    #[serde(alias = "type")]
    op: Op,
    amount: Option<i64>,
}

impl Operation {
    pub fn new(op: Op, amount: Option<i64>) -> Self {
        Operation { op, amount }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Inserted,
    Rejected,
    Printed(bool),
    Refunded(i64),
}

#[cfg(test)]
const PRICE: i64 = 50;

#[cfg(test)]
fn machine() -> TicketMachine {
    TicketMachine::new(PRICE).unwrap()
}

#[test]
fn price_is_set_at_construction() {
    for price in [1, 7, PRICE, i64::MAX] {
        let machine = TicketMachine::new(price).unwrap();
        assert_eq!(machine.price(), price);
        assert_eq!(machine.balance(), 0);
        assert_eq!(machine.total(), 0);
    }
}

#[test]
fn non_positive_price_is_rejected() {
    for price in [0, -1, -10, i64::MIN] {
        let err = TicketMachine::new(price).unwrap_err();
        let TicketMachineError::InvalidArgument(message) = err;
        assert!(message.contains("price must be positive"));
    }
}

#[test]
fn insert_money_accumulates() {
    let mut machine = machine();
    machine.insert_money(10).unwrap();
    machine.insert_money(20).unwrap();
    assert_eq!(machine.balance(), 30);
    assert_eq!(machine.total(), 0);
}

#[test]
fn balance_is_sum_of_accepted_amounts() {
    let mut machine = machine();
    let mut expected = 0;

    for amount in [5, 0, 12, -3, 1, 40, -100, 0, 7, 25] {
        match machine.insert_money(amount) {
            Ok(()) => {
                assert!(amount > 0);
                expected += amount;
            }
            Err(_) => assert!(amount <= 0),
        }
        assert_eq!(machine.balance(), expected);
    }
    assert_eq!(machine.balance(), 90);
    assert_eq!(machine.total(), 0);
}

#[test]
fn non_positive_amount_is_rejected() {
    let mut machine = machine();
    machine.insert_money(15).unwrap();

    for amount in [0, -5] {
        let err = machine.insert_money(amount).unwrap_err();
        assert!(err.to_string().contains("amount must be positive"));
    }
    assert_eq!(machine.balance(), 15);
}

#[test]
fn overflowing_amount_is_rejected() {
    let mut machine = machine();
    machine.insert_money(i64::MAX).unwrap();
    assert!(machine.insert_money(1).is_err());
    assert_eq!(machine.balance(), i64::MAX);
}

#[test]
fn no_print_when_insufficient() {
    let mut machine = machine();
    machine.insert_money(PRICE - 1).unwrap();
    assert!(!machine.print_ticket());
    assert_eq!(machine.balance(), 49);
    assert_eq!(machine.total(), 0);
}

#[test]
fn print_with_exact_amount() {
    let mut machine = machine();
    machine.insert_money(PRICE).unwrap();
    assert!(machine.print_ticket());
    assert_eq!(machine.balance(), 0);
    assert_eq!(machine.total(), 50);
}

#[test]
fn print_keeps_the_excess() {
    let mut machine = machine();
    machine.insert_money(80).unwrap();
    assert!(machine.print_ticket());
    assert_eq!(machine.balance(), 30);
    assert_eq!(machine.total(), 50);
}

#[test]
fn total_only_changes_on_print() {
    let mut machine = machine();
    machine.insert_money(PRICE).unwrap();
    assert_eq!(machine.total(), 0);
    machine.print_ticket();
    assert_eq!(machine.total(), PRICE);
}

#[test]
fn multiple_tickets() {
    let mut machine = machine();
    machine.insert_money(PRICE * 3).unwrap();
    assert!(machine.print_ticket());
    assert!(machine.print_ticket());
    assert!(machine.print_ticket());
    assert!(!machine.print_ticket());
    assert_eq!(machine.balance(), 0);
    assert_eq!(machine.total(), 150);
}

#[test]
fn print_with_no_money() {
    let mut machine = machine();
    assert!(!machine.print_ticket());
    assert_eq!(machine.balance(), 0);
    assert_eq!(machine.total(), 0);
}

#[test]
fn print_succeeds_iff_balance_covers_price() {
    for inserted in 1..=120 {
        let mut machine = machine();
        machine.insert_money(inserted).unwrap();
        let printed = machine.print_ticket();
        assert_eq!(printed, inserted >= PRICE);
        if printed {
            assert_eq!(machine.balance(), inserted - PRICE);
            assert_eq!(machine.total(), PRICE);
        } else {
            assert_eq!(machine.balance(), inserted);
            assert_eq!(machine.total(), 0);
        }
    }
}

#[test]
fn refund_returns_balance() {
    let mut machine = machine();
    machine.insert_money(80).unwrap();
    assert_eq!(machine.refund(), 80);
    assert_eq!(machine.balance(), 0);
}

#[test]
fn refund_after_print_returns_change() {
    let mut machine = machine();
    machine.insert_money(75).unwrap();
    machine.print_ticket();
    assert_eq!(machine.refund(), 25);
    assert_eq!(machine.balance(), 0);
    assert_eq!(machine.total(), 50);
}

#[test]
fn refund_with_zero_balance() {
    let mut machine = machine();
    assert_eq!(machine.refund(), 0);
    assert_eq!(machine.refund(), 0);
    assert_eq!(machine.balance(), 0);
    assert_eq!(machine.total(), 0);
}

#[test]
fn apply_reports_outcomes() {
    let mut machine = machine();

    assert_eq!(
        machine.apply(Operation::new(Op::Insert, Some(60))),
        Outcome::Inserted
    );
    assert_eq!(
        machine.apply(Operation::new(Op::Insert, Some(-5))),
        Outcome::Rejected
    );
    assert_eq!(
        machine.apply(Operation::new(Op::Insert, None)),
        Outcome::Rejected
    );
    assert_eq!(
        machine.apply(Operation::new(Op::Print, None)),
        Outcome::Printed(true)
    );
    assert_eq!(
        machine.apply(Operation::new(Op::Print, Some(100))),
        Outcome::Printed(false)
    );
    assert_eq!(
        machine.apply(Operation::new(Op::Refund, None)),
        Outcome::Refunded(10)
    );
    assert_eq!(machine.total(), 50);
}
