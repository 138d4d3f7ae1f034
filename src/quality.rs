use std::fmt;

use rust_decimal::Decimal;
use serde::{Serialize, Serializer};

use crate::config::QualityRules;
use crate::error::InvalidRecordError;
use crate::fees;
use crate::payments::{AnnotatedPayment, RawPayment};

/// Data-quality defect attached to a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QualityFinding {
    InvalidEmail,
    DuplicatedPayment,
    AmountThreshold,
}

impl QualityFinding {
    pub const fn as_str(self) -> &'static str {
        match self {
            QualityFinding::InvalidEmail => "InvalidEmail",
            QualityFinding::DuplicatedPayment => "DuplicatedPayment",
            QualityFinding::AmountThreshold => "AmountThreshold",
        }
    }
}

impl fmt::Display for QualityFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered findings for one payment. Serializes to `null` when empty,
/// otherwise to the comma-joined codes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QualityFindings(Vec<QualityFinding>);

impl QualityFindings {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = QualityFinding> + '_ {
        self.0.iter().copied()
    }

    pub fn to_wire(&self) -> Option<String> {
        (!self.is_empty()).then(|| self.to_string())
    }
}

impl FromIterator<QualityFinding> for QualityFindings {
    fn from_iter<I: IntoIterator<Item = QualityFinding>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for QualityFindings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, finding) in self.0.iter().enumerate() {
            if idx > 0 {
                f.write_str(",")?;
            }
            f.write_str(finding.as_str())?;
        }
        Ok(())
    }
}

impl Serialize for QualityFindings {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.to_wire() {
            Some(codes) => serializer.serialize_str(&codes),
            None => serializer.serialize_none(),
        }
    }
}

/// Annotates a batch of portal payments with fees, balance and quality
/// findings. Holds only its rules; batches share no state.
#[derive(Debug, Clone, Default)]
pub struct QualityAnnotator {
    rules: QualityRules,
}

impl QualityAnnotator {
    pub fn new(rules: QualityRules) -> Self {
        Self { rules }
    }

    /// A missing address is invalid too.
    pub fn check_contact_address(&self, payment: &RawPayment) -> Option<QualityFinding> {
        match payment.email.as_deref() {
            Some(address) if self.rules.contact_pattern.is_match(address) => None,
            _ => Some(QualityFinding::InvalidEmail),
        }
    }

    pub fn check_amount_threshold(
        &self,
        amount_received: Option<Decimal>,
    ) -> Option<QualityFinding> {
        amount_received
            .filter(|received| *received > self.rules.amount_threshold)
            .map(|_| QualityFinding::AmountThreshold)
    }

    /// Flags the payment when some other record in the batch matches it.
    /// The payment itself is part of `batch`, hence the `> 1`.
    pub fn check_duplicate(
        &self,
        payment: &RawPayment,
        batch: &[RawPayment],
    ) -> Option<QualityFinding> {
        let matches = batch
            .iter()
            .filter(|other| is_duplicate_match(payment, other))
            .count();
        (matches > 1).then_some(QualityFinding::DuplicatedPayment)
    }

    pub fn findings_for(&self, payment: &RawPayment, batch: &[RawPayment]) -> QualityFindings {
        [
            self.check_contact_address(payment),
            self.check_duplicate(payment, batch),
            self.check_amount_threshold(payment.amount_received),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    pub fn annotate_record(
        &self,
        payment: &RawPayment,
        batch: &[RawPayment],
    ) -> Result<AnnotatedPayment, InvalidRecordError> {
        let amount_with_fees = fees::amount_with_fees(payment)?;
        let balance = fees::classify(payment, amount_with_fees)?;
        Ok(AnnotatedPayment {
            reference: payment.reference.clone(),
            amount: payment.amount,
            amount_with_fees,
            amount_received: payment.amount_received,
            quality_check: self.findings_for(payment, batch),
            over_payment: balance.over_payment(),
            under_payment: balance.under_payment(),
        })
    }

    /// One annotation per payment, in batch order. The first record that
    /// cannot be classified fails the whole batch.
    pub fn annotate(&self, batch: &[RawPayment]) -> Result<Vec<AnnotatedPayment>, InvalidRecordError> {
        batch
            .iter()
            .map(|payment| self.annotate_record(payment, batch))
            .collect()
    }
}

/// Same student, same school (ignoring case) and same amount received.
/// An absent value on either side never matches, not even another absent
/// value, so incomplete records are never reported as duplicates.
pub fn is_duplicate_match(left: &RawPayment, right: &RawPayment) -> bool {
    same_student(left.student_id, right.student_id)
        && same_amount(left.amount_received, right.amount_received)
        && same_school(left.school.as_deref(), right.school.as_deref())
}

fn same_student(left: Option<i32>, right: Option<i32>) -> bool {
    matches!((left, right), (Some(left), Some(right)) if left == right)
}

fn same_amount(left: Option<Decimal>, right: Option<Decimal>) -> bool {
    matches!((left, right), (Some(left), Some(right)) if left == right)
}

fn same_school(left: Option<&str>, right: Option<&str>) -> bool {
    match (left, right) {
        (Some(left), Some(right)) => left
            .chars()
            .flat_map(char::to_lowercase)
            .eq(right.chars().flat_map(char::to_lowercase)),
        _ => false,
    }
}
