//! Domain types for the FlexiMart catalog.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A product in the `products` collection.
///
/// `product_id` is the unique key and doubles as the document id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub product_id: String,
    pub name: String,
    pub category: String,
    pub price: f64,
    pub stock: i64,
    #[serde(default)]
    pub reviews: Vec<Review>,
}

/// A customer review attached to a product.
///
/// Reviews are append-only in this workload: they are pushed onto a
/// product's `reviews` array and never edited or removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub user_id: String,
    pub username: String,
    pub rating: f64,
    pub comment: String,
    pub date: DateTime<Utc>,
}

/// Input for appending a review; the date is stamped at append time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewReview {
    pub user_id: String,
    pub username: String,
    pub rating: f64,
    pub comment: String,
}

impl NewReview {
    /// Stamp the review with the current time.
    pub fn into_review(self) -> Review {
        Review {
            user_id: self.user_id,
            username: self.username,
            rating: self.rating,
            comment: self.comment,
            date: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_product_roundtrip() {
        let value = json!({
            "product_id": "ELEC001",
            "name": "Laptop",
            "category": "Electronics",
            "price": 55000.0,
            "stock": 12,
            "reviews": [{
                "user_id": "U1",
                "username": "a",
                "rating": 4.5,
                "comment": "solid",
                "date": "2024-01-01T00:00:00Z"
            }]
        });

        let product: Product = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(product.reviews.len(), 1);
        assert_eq!(serde_json::to_value(&product).unwrap(), value);
    }

    #[test]
    fn test_reviews_default_empty() {
        let product: Product = serde_json::from_value(json!({
            "product_id": "X", "name": "n", "category": "c", "price": 1.0, "stock": 0
        }))
        .unwrap();
        assert!(product.reviews.is_empty());
    }

    #[test]
    fn test_new_review_stamps_date() {
        let review = NewReview {
            user_id: "U999".into(),
            username: "ValueBuyer".into(),
            rating: 4.0,
            comment: "Good value for money".into(),
        }
        .into_review();
        assert_eq!(review.username, "ValueBuyer");
        assert!(review.date <= Utc::now());
    }
}
