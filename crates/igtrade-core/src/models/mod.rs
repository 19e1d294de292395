//! Data models for the IG dealing API.
//!
//! Field names follow the gateway's camelCase JSON. Prices, sizes and
//! distances are `Decimal` on our side and plain JSON numbers on the wire.

pub mod account;
pub mod common;
pub mod confirm;
pub mod order;
pub mod position;

pub use account::{AccountBalance, AccountInfo, AccountSummary};
pub use common::{Direction, InstrumentType, MarketStatus, OrderType, PositionTimeInForce};
pub use confirm::{
    AffectedDeal, AffectedDealStatus, DealConfirmation, DealReference, DealStatus, PositionStatus,
};
pub use order::{
    CreateWorkingOrder, MarketData, UpdateWorkingOrder, WorkingOrder, WorkingOrderData,
    WorkingOrderTimeInForce, WorkingOrderType, WorkingOrders,
};
pub use position::{
    ClosePosition, CreatePosition, Market, OpenPosition, OpenPositions, Position, UpdatePosition,
};
