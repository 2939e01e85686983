//! # Repository Module
//!
//! SQLite repository implementations for the Coupon Manager.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  CouponStore                                                           │
//! │       │                                                                 │
//! │       │  backend.find_by_code("SAVE10")                                │
//! │       ▼                                                                 │
//! │  SqliteCouponRepository (impl CouponBackend)                           │
//! │  ├── list / get / find_by_code                                         │
//! │  └── insert / update / delete                                          │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod coupon;
