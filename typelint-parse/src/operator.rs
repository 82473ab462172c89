use ahash::HashMap;
use ahash::HashMapExt;
use once_cell::sync::Lazy;
use serde::Serialize;

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Associativity {
  Left,
  Right,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize)]
pub enum OperatorName {
  Addition,
  Assignment,
  AssignmentAddition,
  AssignmentBitwiseAnd,
  AssignmentBitwiseLeftShift,
  AssignmentBitwiseOr,
  AssignmentBitwiseRightShift,
  AssignmentBitwiseUnsignedRightShift,
  AssignmentBitwiseXor,
  AssignmentDivision,
  AssignmentExponentiation,
  AssignmentLogicalAnd,
  AssignmentLogicalOr,
  AssignmentMultiplication,
  AssignmentNullishCoalescing,
  AssignmentRemainder,
  AssignmentSubtraction,
  Await,
  BitwiseAnd,
  BitwiseLeftShift,
  BitwiseNot,
  BitwiseOr,
  BitwiseRightShift,
  BitwiseUnsignedRightShift,
  BitwiseXor,
  Call,
  Comma,
  ComputedMemberAccess,
  Conditional,
  ConditionalAlternate,
  Delete,
  Division,
  Equality,
  Exponentiation,
  GreaterThan,
  GreaterThanOrEqual,
  In,
  Inequality,
  Instanceof,
  LessThan,
  LessThanOrEqual,
  LogicalAnd,
  LogicalNot,
  LogicalOr,
  MemberAccess,
  Multiplication,
  New,
  NullishCoalescing,
  OptionalChainingCall,
  OptionalChainingComputedMemberAccess,
  OptionalChainingMemberAccess,
  PostfixDecrement,
  PostfixIncrement,
  PrefixDecrement,
  PrefixIncrement,
  Remainder,
  StrictEquality,
  StrictInequality,
  Subtraction,
  Typeof,
  UnaryNegation,
  UnaryPlus,
  Void,
  Yield,
  YieldDelegated,
}

impl OperatorName {
  pub fn is_assignment(self) -> bool {
    matches!(
      self,
      OperatorName::Assignment
        | OperatorName::AssignmentAddition
        | OperatorName::AssignmentBitwiseAnd
        | OperatorName::AssignmentBitwiseLeftShift
        | OperatorName::AssignmentBitwiseOr
        | OperatorName::AssignmentBitwiseRightShift
        | OperatorName::AssignmentBitwiseUnsignedRightShift
        | OperatorName::AssignmentBitwiseXor
        | OperatorName::AssignmentDivision
        | OperatorName::AssignmentExponentiation
        | OperatorName::AssignmentLogicalAnd
        | OperatorName::AssignmentLogicalOr
        | OperatorName::AssignmentMultiplication
        | OperatorName::AssignmentNullishCoalescing
        | OperatorName::AssignmentRemainder
        | OperatorName::AssignmentSubtraction
    )
  }

  pub fn is_comparison(self) -> bool {
    matches!(
      self,
      OperatorName::Equality
        | OperatorName::GreaterThan
        | OperatorName::GreaterThanOrEqual
        | OperatorName::In
        | OperatorName::Inequality
        | OperatorName::Instanceof
        | OperatorName::LessThan
        | OperatorName::LessThanOrEqual
        | OperatorName::StrictEquality
        | OperatorName::StrictInequality
    )
  }
}

pub struct Operator {
  pub name: OperatorName,
  pub precedence: u8,
  pub associativity: Associativity,
}

const PRECEDENCE_LEVELS: &[&[(OperatorName, Associativity)]] = &[
  &[(OperatorName::MemberAccess, Associativity::Left), (OperatorName::ComputedMemberAccess, Associativity::Left), (OperatorName::Call, Associativity::Left), (OperatorName::OptionalChainingMemberAccess, Associativity::Left), (OperatorName::OptionalChainingComputedMemberAccess, Associativity::Left), (OperatorName::OptionalChainingCall, Associativity::Left)],
  &[(OperatorName::New, Associativity::Right)],
  &[(OperatorName::PostfixIncrement, Associativity::Left), (OperatorName::PostfixDecrement, Associativity::Left)],
  &[(OperatorName::LogicalNot, Associativity::Right), (OperatorName::BitwiseNot, Associativity::Right), (OperatorName::UnaryPlus, Associativity::Right), (OperatorName::UnaryNegation, Associativity::Right), (OperatorName::PrefixIncrement, Associativity::Right), (OperatorName::PrefixDecrement, Associativity::Right), (OperatorName::Typeof, Associativity::Right), (OperatorName::Void, Associativity::Right), (OperatorName::Delete, Associativity::Right), (OperatorName::Await, Associativity::Right)],
  &[(OperatorName::Exponentiation, Associativity::Right)],
  &[(OperatorName::Multiplication, Associativity::Left), (OperatorName::Division, Associativity::Left), (OperatorName::Remainder, Associativity::Left)],
  &[(OperatorName::Addition, Associativity::Left), (OperatorName::Subtraction, Associativity::Left)],
  &[(OperatorName::BitwiseLeftShift, Associativity::Left), (OperatorName::BitwiseRightShift, Associativity::Left), (OperatorName::BitwiseUnsignedRightShift, Associativity::Left)],
  &[(OperatorName::LessThan, Associativity::Left), (OperatorName::LessThanOrEqual, Associativity::Left), (OperatorName::GreaterThan, Associativity::Left), (OperatorName::GreaterThanOrEqual, Associativity::Left), (OperatorName::In, Associativity::Left), (OperatorName::Instanceof, Associativity::Left)],
  &[(OperatorName::Equality, Associativity::Left), (OperatorName::Inequality, Associativity::Left), (OperatorName::StrictEquality, Associativity::Left), (OperatorName::StrictInequality, Associativity::Left)],
  &[(OperatorName::BitwiseAnd, Associativity::Left)],
  &[(OperatorName::BitwiseXor, Associativity::Left)],
  &[(OperatorName::BitwiseOr, Associativity::Left)],
  &[(OperatorName::LogicalAnd, Associativity::Left)],
  &[(OperatorName::LogicalOr, Associativity::Left), (OperatorName::NullishCoalescing, Associativity::Left)],
  &[
    (OperatorName::Conditional, Associativity::Right),
    (OperatorName::ConditionalAlternate, Associativity::Right),
    (OperatorName::Assignment, Associativity::Right),
    (OperatorName::AssignmentAddition, Associativity::Right),
    (OperatorName::AssignmentBitwiseAnd, Associativity::Right),
    (OperatorName::AssignmentBitwiseLeftShift, Associativity::Right),
    (OperatorName::AssignmentBitwiseOr, Associativity::Right),
    (OperatorName::AssignmentBitwiseRightShift, Associativity::Right),
    (OperatorName::AssignmentBitwiseUnsignedRightShift, Associativity::Right),
    (OperatorName::AssignmentBitwiseXor, Associativity::Right),
    (OperatorName::AssignmentDivision, Associativity::Right),
    (OperatorName::AssignmentExponentiation, Associativity::Right),
    (OperatorName::AssignmentLogicalAnd, Associativity::Right),
    (OperatorName::AssignmentLogicalOr, Associativity::Right),
    (OperatorName::AssignmentMultiplication, Associativity::Right),
    (OperatorName::AssignmentNullishCoalescing, Associativity::Right),
    (OperatorName::AssignmentRemainder, Associativity::Right),
    (OperatorName::AssignmentSubtraction, Associativity::Right),
    (OperatorName::Yield, Associativity::Right),
    (OperatorName::YieldDelegated, Associativity::Right),
  ],
  &[(OperatorName::Comma, Associativity::Left)],
];

/// All operators keyed by name. Higher precedence binds tighter; the comma operator is 1.
pub static OPERATORS: Lazy<HashMap<OperatorName, Operator>> = Lazy::new(|| {
  let mut map = HashMap::<OperatorName, Operator>::new();
  for (i, level) in PRECEDENCE_LEVELS.iter().enumerate() {
    let precedence = (PRECEDENCE_LEVELS.len() - i) as u8;
    for &(name, associativity) in level.iter() {
      map.insert(name, Operator {
        name,
        precedence,
        associativity,
      });
    }
  }
  map
});

#[cfg(test)]
mod tests {
  use super::OperatorName;
  use super::OPERATORS;

  #[test]
  fn precedence_ordering() {
    let prec = |name| OPERATORS[&name].precedence;
    assert_eq!(prec(OperatorName::Comma), 1);
    assert!(prec(OperatorName::Multiplication) > prec(OperatorName::Addition));
    assert!(prec(OperatorName::Addition) > prec(OperatorName::LessThan));
    assert!(prec(OperatorName::LogicalAnd) > prec(OperatorName::LogicalOr));
    assert_eq!(prec(OperatorName::Assignment), prec(OperatorName::Conditional));
    assert!(prec(OperatorName::Call) > prec(OperatorName::New));
  }
}
