//! Core types for the library engine.
//!
//! Field names serialize in camelCase; the persisted collections are direct
//! serializations of these shapes.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Number of physical seats. Seats are numbered `1..=SEAT_COUNT`.
pub const SEAT_COUNT: u16 = 102;

/// Maximum number of activity log entries kept.
pub const ACTIVITY_LOG_CAPACITY: usize = 50;

/// Maximum number of notification log entries kept.
pub const NOTIFICATION_LOG_CAPACITY: usize = 100;

/// Returns true if `number` names one of the fixed seats.
pub fn is_valid_seat(number: u16) -> bool {
    (1..=SEAT_COUNT).contains(&number)
}

/// Unique identifier for a student.
#[derive(Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentId(pub String);

impl StudentId {
    /// Creates a new random student ID (`student-<uuid>`).
    pub fn new() -> Self {
        Self(format!("student-{}", Uuid::new_v4()))
    }

    /// Creates a student ID from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Returns the student ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for StudentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for StudentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for StudentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for StudentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

// ============================================================================
// Students
// ============================================================================

/// Membership status of a student.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StudentStatus {
    #[default]
    Active,
    Inactive,
    Expired,
}

impl StudentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Expired => "expired",
        }
    }
}

impl std::fmt::Display for StudentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for StudentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            "expired" => Ok(Self::Expired),
            other => Err(format!("unknown student status: {other}")),
        }
    }
}

/// How a fee was paid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMode {
    Online,
    Offline,
}

impl PaymentMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Offline => "offline",
        }
    }
}

impl std::fmt::Display for PaymentMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PaymentMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "online" => Ok(Self::Online),
            "offline" => Ok(Self::Offline),
            other => Err(format!("unknown payment mode: {other}")),
        }
    }
}

/// A registered student.
///
/// `seat_number` is a back-reference to a [`Seat`]; only the engine's seat
/// routines change it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: StudentId,
    pub name: String,
    pub mobile: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub parent_name: String,
    pub parent_mobile: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seat_number: Option<u16>,
    pub registration_date: NaiveDate,
    pub fee_expiry_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_fee_payment: Option<NaiveDate>,
    pub status: StudentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_mode: Option<PaymentMode>,
    /// Running total; only fee transactions increase it.
    #[serde(default)]
    pub total_fees_paid: u64,
}

/// A student to be registered.
///
/// The engine assigns the id; seat, payment and totals start empty.
#[derive(Clone, Debug)]
pub struct NewStudent {
    pub name: String,
    pub mobile: String,
    pub email: Option<String>,
    pub parent_name: String,
    pub parent_mobile: String,
    pub address: Option<String>,
    pub vehicle_number: Option<String>,
    pub photo: Option<String>,
    pub registration_date: NaiveDate,
    pub fee_expiry_date: NaiveDate,
    pub status: StudentStatus,
}

impl NewStudent {
    pub(crate) fn into_student(self, id: StudentId) -> Student {
        Student {
            id,
            name: self.name,
            mobile: self.mobile,
            email: self.email,
            parent_name: self.parent_name,
            parent_mobile: self.parent_mobile,
            address: self.address,
            vehicle_number: self.vehicle_number,
            photo: self.photo,
            seat_number: None,
            registration_date: self.registration_date,
            fee_expiry_date: self.fee_expiry_date,
            last_fee_payment: None,
            status: self.status,
            payment_mode: None,
            total_fees_paid: 0,
        }
    }
}

/// Field-level changes to a student.
///
/// There is no seat or fee-total field: seats move only through
/// assign/release and totals only through recorded payments.
#[derive(Clone, Debug, Default)]
pub struct StudentUpdate {
    pub name: Option<String>,
    pub mobile: Option<String>,
    pub email: Option<String>,
    pub parent_name: Option<String>,
    pub parent_mobile: Option<String>,
    pub address: Option<String>,
    pub vehicle_number: Option<String>,
    pub photo: Option<String>,
    pub registration_date: Option<NaiveDate>,
    pub fee_expiry_date: Option<NaiveDate>,
    pub last_fee_payment: Option<NaiveDate>,
    pub status: Option<StudentStatus>,
    pub payment_mode: Option<PaymentMode>,
}

impl StudentUpdate {
    /// Update that only changes the status.
    pub fn status(status: StudentStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    /// Merges the provided fields over `student`.
    pub(crate) fn apply(self, student: &mut Student) {
        if let Some(v) = self.name {
            student.name = v;
        }
        if let Some(v) = self.mobile {
            student.mobile = v;
        }
        if let Some(v) = self.email {
            student.email = Some(v);
        }
        if let Some(v) = self.parent_name {
            student.parent_name = v;
        }
        if let Some(v) = self.parent_mobile {
            student.parent_mobile = v;
        }
        if let Some(v) = self.address {
            student.address = Some(v);
        }
        if let Some(v) = self.vehicle_number {
            student.vehicle_number = Some(v);
        }
        if let Some(v) = self.photo {
            student.photo = Some(v);
        }
        if let Some(v) = self.registration_date {
            student.registration_date = v;
        }
        if let Some(v) = self.fee_expiry_date {
            student.fee_expiry_date = v;
        }
        if let Some(v) = self.last_fee_payment {
            student.last_fee_payment = Some(v);
        }
        if let Some(v) = self.status {
            student.status = v;
        }
        if let Some(v) = self.payment_mode {
            student.payment_mode = Some(v);
        }
    }
}

// ============================================================================
// Seats
// ============================================================================

/// One of the fixed physical seats.
///
/// `student_id`, `student_name` and `assigned_date` are set only while occupied
/// and always mirror the student whose `seat_number` equals `number`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seat {
    pub number: u16,
    pub is_occupied: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_id: Option<StudentId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_date: Option<NaiveDate>,
}

impl Seat {
    /// An unoccupied seat.
    pub fn vacant(number: u16) -> Self {
        Self {
            number,
            is_occupied: false,
            student_id: None,
            student_name: None,
            assigned_date: None,
        }
    }
}

// ============================================================================
// Fee transactions
// ============================================================================

/// A recorded fee payment. Never mutated or deleted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeTransaction {
    pub id: String,
    pub student_id: StudentId,
    /// Name at the time of payment; not re-resolved later.
    pub student_name: String,
    pub amount: u64,
    pub payment_mode: PaymentMode,
    /// Free-form method label such as `UPI`, `Cash` or `Card`.
    pub payment_method: String,
    pub transaction_date: NaiveDate,
    /// Fee expiry this payment buys.
    pub expiry_date: NaiveDate,
    pub receipt_number: String,
}

/// A payment to be recorded. Id and receipt number are assigned by the engine.
#[derive(Clone, Debug)]
pub struct NewTransaction {
    pub student_id: StudentId,
    pub student_name: String,
    pub amount: u64,
    pub payment_mode: PaymentMode,
    pub payment_method: String,
    pub transaction_date: NaiveDate,
    pub expiry_date: NaiveDate,
}

/// Receipt number for the `sequence`-th transaction: `RCP001`, `RCP002`, ...
pub fn receipt_number(sequence: usize) -> String {
    format!("RCP{:03}", sequence)
}

// ============================================================================
// Activity log
// ============================================================================

/// Category of an activity log entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Registration,
    Payment,
    SeatAssignment,
    Reminder,
}

impl ActivityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Registration => "registration",
            Self::Payment => "payment",
            Self::SeatAssignment => "seat_assignment",
            Self::Reminder => "reminder",
        }
    }
}

/// A user-visible audit entry derived from a mutation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLogEntry {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    /// Pre-rendered text; never re-derived.
    pub message: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_name: Option<String>,
}

impl ActivityLogEntry {
    pub fn new(kind: ActivityKind, message: impl Into<String>, student_name: Option<String>) -> Self {
        Self {
            id: ulid::Ulid::new().to_string(),
            kind,
            message: message.into(),
            timestamp: Utc::now(),
            student_name,
        }
    }
}

// ============================================================================
// Notifications
// ============================================================================

/// Which message template a notification used.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Welcome,
    FeeConfirmation,
    FeeReminder,
    Goodbye,
    Custom,
}

impl NotificationKind {
    /// Human label used in activity messages.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Welcome => "Welcome",
            Self::FeeConfirmation => "Fee confirmation",
            Self::FeeReminder => "Fee reminder",
            Self::Goodbye => "Goodbye",
            Self::Custom => "Custom",
        }
    }
}

impl std::str::FromStr for NotificationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "welcome" => Ok(Self::Welcome),
            "fee_confirmation" => Ok(Self::FeeConfirmation),
            "fee_reminder" => Ok(Self::FeeReminder),
            "goodbye" => Ok(Self::Goodbye),
            "custom" => Ok(Self::Custom),
            other => Err(format!("unknown notification kind: {other}")),
        }
    }
}

/// Delivery channel of a logged notification.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchMethod {
    #[default]
    WhatsappRedirect,
}

/// Record that a notification was handed to the outbound dispatcher.
///
/// "Sent" means queued for opening; delivery is never confirmed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationLogEntry {
    pub id: String,
    pub student_id: StudentId,
    pub student_name: String,
    pub mobile: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub message: String,
    pub sent_at: DateTime<Utc>,
    #[serde(default)]
    pub method: DispatchMethod,
}
