//! Fixed templates the mock generator draws from.

/// A product family; each expands into [`VARIANTS`] catalog items.
#[derive(Debug)]
pub struct Archetype {
    pub name: &'static str,
    pub tags: &'static [&'static str],
    pub category_id: &'static str,
    pub category_name: &'static str,
    pub image_slug: &'static str,
    pub price: (f64, f64),
    pub commission: (f64, f64),
    pub rating: (f64, f64),
    pub orders: (u64, u64),
}

impl Archetype {
    /// Case-insensitive: every term must occur in the name or a tag.
    pub fn matches(&self, keywords: &str) -> bool {
        let haystack = format!("{} {}", self.name, self.tags.join(" ")).to_lowercase();
        let mut terms = keywords.split_whitespace().peekable();
        if terms.peek().is_none() {
            return true;
        }
        terms.all(|term| haystack.contains(&term.to_lowercase()))
    }
}

pub const VARIANTS: [&str; 10] = [
    "Classic", "Pro", "Lite", "Max", "Mini", "Plus", "Ultra", "Air", "Sport", "Edge",
];

pub const ARCHETYPES: &[Archetype] = &[
    Archetype {
        name: "Wireless Bluetooth Headphones",
        tags: &["headphones", "headset", "earbuds", "audio", "bluetooth", "noise cancelling"],
        category_id: "44",
        category_name: "Consumer Electronics",
        image_slug: "headphones",
        price: (15.0, 89.0),
        commission: (6.0, 12.0),
        rating: (92.0, 99.0),
        orders: (500, 25_000),
    },
    Archetype {
        name: "Smart Watch Fitness Tracker",
        tags: &["smartwatch", "watch", "fitness", "tracker", "wearable"],
        category_id: "44",
        category_name: "Consumer Electronics",
        image_slug: "smartwatch",
        price: (19.0, 129.0),
        commission: (5.0, 10.0),
        rating: (90.0, 98.0),
        orders: (300, 18_000),
    },
    Archetype {
        name: "Shockproof Phone Case",
        tags: &["phone", "case", "cover", "iphone", "samsung", "accessories"],
        category_id: "509",
        category_name: "Phones & Telecommunications",
        image_slug: "phone-case",
        price: (1.5, 12.0),
        commission: (8.0, 15.0),
        rating: (93.0, 99.5),
        orders: (1_000, 60_000),
    },
    Archetype {
        name: "Portable Power Bank",
        tags: &["power bank", "battery", "charger", "usb", "portable"],
        category_id: "509",
        category_name: "Phones & Telecommunications",
        image_slug: "power-bank",
        price: (9.0, 45.0),
        commission: (5.0, 9.0),
        rating: (91.0, 98.0),
        orders: (200, 12_000),
    },
    Archetype {
        name: "Mechanical Gaming Keyboard",
        tags: &["keyboard", "mechanical", "gaming", "rgb", "computer"],
        category_id: "7",
        category_name: "Computer & Office",
        image_slug: "keyboard",
        price: (22.0, 110.0),
        commission: (5.0, 8.0),
        rating: (90.0, 98.5),
        orders: (100, 9_000),
    },
    Archetype {
        name: "RGB LED Strip Lights",
        tags: &["led", "lights", "strip", "rgb", "home", "decor"],
        category_id: "39",
        category_name: "Lights & Lighting",
        image_slug: "led-strip",
        price: (4.0, 30.0),
        commission: (7.0, 14.0),
        rating: (89.0, 97.0),
        orders: (800, 40_000),
    },
];

#[derive(Debug)]
pub struct CategoryTemplate {
    pub id: &'static str,
    pub name: &'static str,
    pub parent: Option<&'static str>,
}

const fn top(id: &'static str, name: &'static str) -> CategoryTemplate {
    CategoryTemplate {
        id,
        name,
        parent: None,
    }
}

const fn child(id: &'static str, name: &'static str, parent: &'static str) -> CategoryTemplate {
    CategoryTemplate {
        id,
        name,
        parent: Some(parent),
    }
}

pub const CATEGORIES: &[CategoryTemplate] = &[
    top("44", "Consumer Electronics"),
    top("509", "Phones & Telecommunications"),
    top("7", "Computer & Office"),
    top("39", "Lights & Lighting"),
    top("15", "Home & Garden"),
    top("1501", "Mother & Kids"),
    top("18", "Sports & Entertainment"),
    top("66", "Beauty & Health"),
    child("200003803", "Earphones & Headphones", "44"),
    child("200216623", "Smart Electronics", "44"),
    child("200084017", "Mobile Phone Accessories", "509"),
    child("200003132", "Power Banks", "509"),
    child("200002342", "Keyboards", "7"),
    child("200001384", "LED Strips", "39"),
    child("200003136", "Home Decor", "15"),
    child("100003236", "Fitness & Body Building", "18"),
];
