use crate::models::common::Audit;
use crate::models::pet::Pet;

/// An order for a pet.
///
/// swagger:model order
pub struct Order {
    /// swagger:allOf
    #[serde(flatten)]
    pub audit: Audit,
    pub id: u64,
    /// The ordered pet
    ///
    /// required: true
    pub pet: Pet,
    pub status: Status,
    pub quantity: Quantity,
    pub lines: Vec<Vec<u32>>,
    pub(crate) next: Option<Box<Order>>,
}

/// Status of an order.
pub enum Status {
    Placed,
    Approved,
    Delivered,
}

/// Number of ordered items.
pub type Quantity = u32;

pub fn place(order: Order) -> Order {
    order
}
