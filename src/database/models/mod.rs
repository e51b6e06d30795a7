pub mod bill;
pub mod budget;
pub mod category;
pub mod investment;
pub mod payment;
pub mod subscription;
pub mod transaction;
pub mod user;
pub mod watchlist;

pub use bill::{Bill, BillFilter, BillStatus, NewBill, Recurrence};
pub use budget::{Budget, BudgetCategory, BudgetMethod, NewBudget, NewBudgetCategory};
pub use category::{Category, CategoryKind, NewCategory};
pub use investment::{AccountType, AssetClass, Holding, NewAssetClass, NewHolding};
pub use payment::{NewPayment, Payment};
pub use subscription::{BillingCycle, NewSubscription, Subscription, SubscriptionStatus};
pub use transaction::{NewTransaction, Transaction, TransactionFilter, MAX_PAGE_SIZE};
pub use user::{User, UserCredentials};
pub use watchlist::{NewWatchlistItem, WatchlistItem};
