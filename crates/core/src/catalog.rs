use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::domain::book::{Book, BookId};
use crate::domain::cart::{validate_username, Cart};
use crate::domain::inventory::Inventory;
use crate::domain::order::OrderReceipt;
use crate::errors::{ApplicationError, CatalogError, MalformedStore};
use crate::store::{CartStore, InventoryStore};

/// Flat amount taken off a book's inventory price each time it enters a cart.
/// The reduction is persisted and never restored.
pub const ADD_TO_CART_PRICE_ADJUSTMENT: Decimal = Decimal::ONE;

/// State for one shopping session, built once at startup and passed to every
/// catalog operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShopSession {
    pub inventory: Inventory,
    pub cart: Cart,
}

impl ShopSession {
    pub fn username(&self) -> &str {
        self.cart.username()
    }
}

pub struct CatalogService<I, C> {
    inventory_store: I,
    cart_store: C,
    inventory_source: String,
}

impl<I, C> CatalogService<I, C>
where
    I: InventoryStore,
    C: CartStore,
{
    pub fn new(inventory_store: I, cart_store: C, inventory_source: impl Into<String>) -> Self {
        Self { inventory_store, cart_store, inventory_source: inventory_source.into() }
    }

    pub fn inventory_source(&self) -> &str {
        &self.inventory_source
    }

    pub fn load_inventory(&self) -> Result<(Inventory, Option<MalformedStore>), ApplicationError> {
        let load = self.inventory_store.load(&self.inventory_source)?;
        if let Some(issue) = &load.issue {
            warn!(
                event_name = "bookstore.store.inventory_malformed",
                source = %self.inventory_source,
                books_loaded = load.books.len(),
                issue = %issue,
                "inventory store is malformed; keeping rows read before the problem"
            );
        }
        Ok((Inventory::new(load.books), load.issue))
    }

    pub fn save_inventory(&self, inventory: &Inventory) -> Result<(), ApplicationError> {
        self.inventory_store.save(inventory.books(), &self.inventory_source)?;
        info!(
            event_name = "bookstore.store.inventory_saved",
            destination = %self.inventory_source,
            books = inventory.len(),
            "inventory saved"
        );
        Ok(())
    }

    pub fn load_cart(&self, username: &str) -> Result<Cart, ApplicationError> {
        let items = self.cart_store.load(username)?;
        Ok(Cart::with_items(username, items))
    }

    /// Loads the inventory and the user's cart into a fresh session.
    pub fn open_session(
        &self,
        username: &str,
    ) -> Result<(ShopSession, Option<MalformedStore>), ApplicationError> {
        let username = validate_username(username)?;
        let (inventory, issue) = self.load_inventory()?;
        let cart = self.load_cart(&username)?;
        info!(
            event_name = "bookstore.session.opened",
            username = %username,
            books = inventory.len(),
            cart_items = cart.len(),
            "shop session opened"
        );
        Ok((ShopSession { inventory, cart }, issue))
    }

    /// Moves `book_id` into the cart, taking the flat adjustment off its
    /// inventory price, then persists inventory and cart.
    pub fn add_to_cart(
        &self,
        cart: &mut Cart,
        inventory: &mut Inventory,
        book_id: BookId,
    ) -> Result<Book, ApplicationError> {
        let book = match inventory.find_mut(book_id) {
            Some(book) => book,
            None => return Err(CatalogError::NotFound { book_id }.into()),
        };
        if !book.is_in_stock() {
            return Err(CatalogError::OutOfStock { book_id, title: book.title.clone() }.into());
        }
        if cart.contains(book_id) {
            return Err(CatalogError::DuplicateInCart { book_id, title: book.title.clone() }.into());
        }

        book.price -= ADD_TO_CART_PRICE_ADJUSTMENT;
        let entry = book.cart_copy();
        cart.push(entry.clone());

        self.inventory_store.save(inventory.books(), &self.inventory_source)?;
        self.cart_store.save(cart.items(), cart.username())?;

        info!(
            event_name = "bookstore.cart.item_added",
            username = %cart.username(),
            book_id = %book_id,
            price = %entry.price,
            cart_items = cart.len(),
            "book added to cart"
        );
        Ok(entry)
    }

    /// Checks out every item in the cart and empties it in memory and in the
    /// store. The cart is untouched unless the receipt could be built and the
    /// store cleared. Inventory is left for the caller to persist.
    pub fn place_order(&self, cart: &mut Cart) -> Result<OrderReceipt, ApplicationError> {
        if cart.is_empty() {
            return Err(CatalogError::EmptyCart.into());
        }
        let total = cart.total().ok_or(CatalogError::TotalOverflow)?;
        let receipt = OrderReceipt::new(cart.username(), cart.items().to_vec(), total);

        self.cart_store.clear(&receipt.username)?;
        cart.clear();

        info!(
            event_name = "bookstore.order.placed",
            username = %receipt.username,
            order_id = %receipt.order_id,
            items = receipt.lines.len(),
            total = %receipt.total,
            placed_at = %receipt.placed_at.to_rfc3339(),
            "order placed"
        );
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use crate::domain::book::{Book, BookId};
    use crate::domain::cart::Cart;
    use crate::domain::inventory::Inventory;
    use crate::errors::{ApplicationError, CatalogError};
    use crate::store::{CartStore, InMemoryCartStore, InMemoryInventoryStore};

    use super::CatalogService;

    const SOURCE: &str = "books.csv";

    type MemoryService = CatalogService<InMemoryInventoryStore, InMemoryCartStore>;

    fn service() -> (MemoryService, InMemoryInventoryStore, InMemoryCartStore) {
        let inventory_store = InMemoryInventoryStore::default();
        let cart_store = InMemoryCartStore::default();
        let service = CatalogService::new(inventory_store.clone(), cart_store.clone(), SOURCE);
        (service, inventory_store, cart_store)
    }

    fn single_book_inventory(price: Decimal) -> Inventory {
        Inventory::new(vec![Book::new(BookId(1), "A", "X", price)])
    }

    #[test]
    fn add_to_cart_decrements_price_and_persists_both_stores() {
        let (service, inventory_store, cart_store) = service();
        let mut inventory = single_book_inventory(Decimal::new(999, 2));
        let mut cart = Cart::new("u");

        let added =
            service.add_to_cart(&mut cart, &mut inventory, BookId(1)).expect("add to cart");

        let expected = Book::new(BookId(1), "A", "", Decimal::new(899, 2));
        assert_eq!(added, expected);
        assert_eq!(cart.items(), &[expected.clone()]);
        assert_eq!(inventory.find(BookId(1)).map(|book| book.price), Some(Decimal::new(899, 2)));
        assert_eq!(
            inventory_store.books(SOURCE),
            Some(vec![Book::new(BookId(1), "A", "X", Decimal::new(899, 2))])
        );
        assert_eq!(cart_store.items("u"), Some(vec![expected]));
    }

    #[test]
    fn unknown_book_is_not_found_and_changes_nothing() {
        let (service, inventory_store, cart_store) = service();
        let mut inventory = single_book_inventory(Decimal::new(999, 2));
        let before = inventory.clone();
        let mut cart = Cart::new("u");

        let error =
            service.add_to_cart(&mut cart, &mut inventory, BookId(42)).expect_err("missing");

        assert!(matches!(
            error,
            ApplicationError::Catalog(CatalogError::NotFound { book_id: BookId(42) })
        ));
        assert_eq!(inventory, before);
        assert!(cart.is_empty());
        assert!(inventory_store.books(SOURCE).is_none());
        assert!(!cart_store.contains("u"));
    }

    #[test]
    fn non_positive_price_is_out_of_stock() {
        for price in [Decimal::ZERO, Decimal::new(-1, 0)] {
            let (service, inventory_store, _) = service();
            let mut inventory = single_book_inventory(price);
            let before = inventory.clone();
            let mut cart = Cart::new("u");

            let error =
                service.add_to_cart(&mut cart, &mut inventory, BookId(1)).expect_err("no stock");

            assert!(matches!(
                error,
                ApplicationError::Catalog(CatalogError::OutOfStock { book_id: BookId(1), .. })
            ));
            assert_eq!(inventory, before);
            assert!(cart.is_empty());
            assert!(inventory_store.books(SOURCE).is_none());
        }
    }

    #[test]
    fn second_add_of_same_book_is_duplicate() {
        let (service, _, _) = service();
        let mut inventory = single_book_inventory(Decimal::new(999, 2));
        let mut cart = Cart::new("u");

        service.add_to_cart(&mut cart, &mut inventory, BookId(1)).expect("first add");
        let error = service.add_to_cart(&mut cart, &mut inventory, BookId(1)).expect_err("dup");

        assert!(matches!(
            error,
            ApplicationError::Catalog(CatalogError::DuplicateInCart { book_id: BookId(1), .. })
        ));
        assert_eq!(cart.len(), 1);
        assert_eq!(inventory.find(BookId(1)).map(|book| book.price), Some(Decimal::new(899, 2)));
    }

    #[test]
    fn place_order_reports_total_and_clears_cart() {
        let (service, _, cart_store) = service();
        let items = vec![Book::new(BookId(1), "A", "", Decimal::new(899, 2))];
        cart_store.save(&items, "u").expect("seed cart");
        let mut cart = Cart::with_items("u", items.clone());

        let receipt = service.place_order(&mut cart).expect("place order");

        assert_eq!(receipt.total, Decimal::new(899, 2));
        assert_eq!(receipt.lines, items);
        assert_eq!(receipt.username, "u");
        assert!(cart.is_empty());
        assert!(!cart_store.contains("u"));
    }

    #[test]
    fn empty_cart_cannot_be_ordered() {
        let (service, _, cart_store) = service();
        cart_store.save(&[], "u").expect("seed empty cart");
        let mut cart = Cart::new("u");

        let error = service.place_order(&mut cart).expect_err("empty cart");

        assert!(matches!(error, ApplicationError::Catalog(CatalogError::EmptyCart)));
        assert!(cart_store.contains("u"), "store must not be touched");
    }

    #[test]
    fn overflowing_total_is_rejected_before_the_store_is_cleared() {
        let (service, _, cart_store) = service();
        let huge = Decimal::from_str_exact("50000000000000000000000000000").expect("decimal");
        let items =
            vec![Book::new(BookId(1), "A", "", huge), Book::new(BookId(2), "B", "", huge)];
        cart_store.save(&items, "u").expect("seed cart");
        let mut cart = Cart::with_items("u", items);

        let error = service.place_order(&mut cart).expect_err("overflow");

        assert!(matches!(error, ApplicationError::Catalog(CatalogError::TotalOverflow)));
        assert!(!error.is_fatal());
        assert_eq!(cart.len(), 2);
        assert_eq!(cart_store.items("u").map(|items| items.len()), Some(2));
    }

    #[test]
    fn book_returns_to_available_with_reduced_price_after_order() {
        let (service, _, _) = service();
        let mut inventory = single_book_inventory(Decimal::new(999, 2));
        let mut cart = Cart::new("u");

        service.add_to_cart(&mut cart, &mut inventory, BookId(1)).expect("add");
        service.place_order(&mut cart).expect("order");
        let again = service.add_to_cart(&mut cart, &mut inventory, BookId(1)).expect("re-add");

        assert_eq!(again.price, Decimal::new(799, 2));
    }

    #[test]
    fn open_session_loads_inventory_and_existing_cart() {
        let inventory_store = InMemoryInventoryStore::with_books(
            SOURCE,
            vec![Book::new(BookId(3), "C", "Z", Decimal::new(500, 2))],
        );
        let cart_store = InMemoryCartStore::default();
        cart_store
            .save(&[Book::new(BookId(3), "C", "Z", Decimal::new(400, 2))], "eve")
            .expect("seed cart");
        let service = CatalogService::new(inventory_store, cart_store, SOURCE);

        let (session, issue) = service.open_session("  eve ").expect("open session");

        assert!(issue.is_none());
        assert_eq!(session.username(), "eve");
        assert_eq!(session.inventory.len(), 1);
        assert_eq!(session.cart.items()[0].author, "");
    }

    #[test]
    fn open_session_rejects_path_like_username() {
        let (service, _, _) = service();
        let error = service.open_session("../root").expect_err("invalid username");
        assert!(matches!(
            error,
            ApplicationError::Catalog(CatalogError::InvalidUsername { .. })
        ));
    }
}
