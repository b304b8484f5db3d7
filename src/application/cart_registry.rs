use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use uuid::Uuid;

use crate::domain::cart::Cart;
use crate::domain::errors::DomainError;
use crate::domain::medication::Medication;

pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(2 * 60 * 60);

#[derive(Debug)]
struct OpenCart {
    cart: Cart,
    touched: Instant,
}

/// Open carts of all client sessions, keyed by sale id.
///
/// Each cart is owned by exactly one entry. Checkout moves the cart out with
/// [`CartRegistry::take`] and hands it back with [`CartRegistry::restore`]
/// when the commit fails, so a cart is never mutated while it is being
/// written.
///
/// A cart nobody has touched for `idle_timeout` is dropped on the next
/// registry access, as if it had been cancelled.
#[derive(Debug)]
pub struct CartRegistry {
    carts: Mutex<HashMap<Uuid, OpenCart>>,
    idle_timeout: Duration,
}

impl Default for CartRegistry {
    fn default() -> Self {
        Self::with_idle_timeout(DEFAULT_IDLE_TIMEOUT)
    }
}

impl CartRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_idle_timeout(idle_timeout: Duration) -> Self {
        Self {
            carts: Mutex::new(HashMap::new()),
            idle_timeout,
        }
    }

    /// Locks the map after evicting idle carts.
    fn carts(&self) -> MutexGuard<'_, HashMap<Uuid, OpenCart>> {
        let mut carts = self.carts.lock().unwrap_or_else(PoisonError::into_inner);
        self.evict_idle(&mut carts, Instant::now());
        carts
    }

    fn evict_idle(&self, carts: &mut HashMap<Uuid, OpenCart>, now: Instant) -> usize {
        let before = carts.len();
        carts.retain(|id, open| {
            let keep = now.saturating_duration_since(open.touched) < self.idle_timeout;
            if !keep {
                log::info!("Cart {} expired after {:?} idle", id, self.idle_timeout);
            }
            keep
        });
        before - carts.len()
    }

    /// Drops every cart idle at `now`; returns how many were dropped.
    pub fn evict_idle_at(&self, now: Instant) -> usize {
        let mut carts = self.carts.lock().unwrap_or_else(PoisonError::into_inner);
        self.evict_idle(&mut carts, now)
    }

    /// Adds a line to the cart `cart_id`, or to a new cart when `cart_id` is
    /// `None`. A new cart is only registered once its first line is accepted.
    pub fn add_product(
        &self,
        cart_id: Option<Uuid>,
        medication: &Medication,
        quantity: i32,
    ) -> Result<Cart, DomainError> {
        let mut carts = self.carts();
        match cart_id {
            Some(id) => {
                let open = carts.get_mut(&id).ok_or(DomainError::NotFound)?;
                open.cart.add_product(medication, quantity)?;
                open.touched = Instant::now();
                Ok(open.cart.clone())
            }
            None => {
                let mut cart = Cart::new();
                cart.add_product(medication, quantity)?;
                log::debug!("Created cart {}", cart.sale_id());
                carts.insert(
                    cart.sale_id(),
                    OpenCart {
                        cart: cart.clone(),
                        touched: Instant::now(),
                    },
                );
                Ok(cart)
            }
        }
    }

    pub fn remove_product(&self, cart_id: Uuid, line_id: Uuid) -> Result<Cart, DomainError> {
        let mut carts = self.carts();
        let open = carts.get_mut(&cart_id).ok_or(DomainError::NotFound)?;
        if open.cart.remove_product(line_id) {
            log::info!("Removed line {} from cart {}", line_id, cart_id);
        }
        open.touched = Instant::now();
        Ok(open.cart.clone())
    }

    pub fn get(&self, cart_id: Uuid) -> Result<Cart, DomainError> {
        let mut carts = self.carts();
        let open = carts.get_mut(&cart_id).ok_or(DomainError::NotFound)?;
        open.touched = Instant::now();
        Ok(open.cart.clone())
    }

    pub fn cancel(&self, cart_id: Uuid) -> Result<(), DomainError> {
        self.carts()
            .remove(&cart_id)
            .map(|_| log::info!("Cart {} cancelled", cart_id))
            .ok_or(DomainError::NotFound)
    }

    pub fn take(&self, cart_id: Uuid) -> Result<Cart, DomainError> {
        self.carts()
            .remove(&cart_id)
            .map(|open| open.cart)
            .ok_or(DomainError::NotFound)
    }

    pub fn restore(&self, cart: Cart) {
        self.carts().insert(
            cart.sale_id(),
            OpenCart {
                cart,
                touched: Instant::now(),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.carts().len()
    }

    pub fn is_empty(&self) -> bool {
        self.carts().is_empty()
    }
}
