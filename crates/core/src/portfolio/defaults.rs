//! Built-in fallback documents used when no tier yields any data.

use super::portfolio_model::{
    AboutInfo, Contact, Continent, GeoInfo, Philosophy, Photo, PhotoCollection, ProfileStats,
    Skills,
};

const UNSPLASH: &str = "https://images.unsplash.com";

fn unsplash(photo: &str, width: u32) -> String {
    format!(
        "{}/{}?ixlib=rb-4.0.3&auto=format&fit=crop&w={}&q=80",
        UNSPLASH, photo, width
    )
}

fn placeholder_photo(id: &str, photo: &str, alt: &str, height: u32) -> Photo {
    Photo {
        id: id.to_string(),
        url: unsplash(photo, 2000),
        thumbnail: unsplash(photo, 400),
        alt: alt.to_string(),
        width: 2000,
        height,
    }
}

/// Profile shown until the owner fills in the about page.
pub fn default_about_info() -> AboutInfo {
    AboutInfo {
        name: "Photographer".to_string(),
        title: "Hi, I'm a photographer".to_string(),
        subtitle: "Recording the beautiful moments of the world through a lens".to_string(),
        location: "Based in Shanghai".to_string(),
        avatar: unsplash("photo-1507003211169-0a1dd7228f2d", 400),
        bio: vec![
            "I focus on portraits, natural landscapes and architecture.".to_string(),
            "I started taking photography seriously in 2020 and have shot across many cities since."
                .to_string(),
            "Every photo has its own story; every shutter press keeps a moment worth keeping."
                .to_string(),
        ],
        philosophy: vec![
            Philosophy {
                title: "Natural".to_string(),
                description: "Real expression under natural light, without heavy retouching."
                    .to_string(),
            },
            Philosophy {
                title: "Emotion".to_string(),
                description: "Catch the emotional instant so each photo reaches the viewer."
                    .to_string(),
            },
            Philosophy {
                title: "Storytelling".to_string(),
                description: "Each photo starts a story told in visual language.".to_string(),
            },
        ],
        skills: Skills {
            photography: vec![
                "Portrait".to_string(),
                "Landscape".to_string(),
                "Architecture".to_string(),
                "Street".to_string(),
            ],
            equipment: vec![
                "Canon EOS R5".to_string(),
                "Sony A7R IV".to_string(),
                "Prime lenses".to_string(),
            ],
        },
        contact: Contact {
            email: "hello@example.com".to_string(),
            phone: "+86 138 0000 0000".to_string(),
            instagram: "https://instagram.com".to_string(),
            weibo: "https://weibo.com".to_string(),
        },
        stats: ProfileStats {
            cities: 3,
            photos: "200+".to_string(),
            experience: "4".to_string(),
        },
        section_labels: None,
    }
}

/// Small sample gallery published when the seed document cannot be fetched.
pub fn placeholder_collections() -> Vec<PhotoCollection> {
    vec![
        PhotoCollection {
            id: "1".to_string(),
            title: "2023 Shanghai".to_string(),
            location: "Shanghai".to_string(),
            year: 2023,
            description: "Streets and alleys where the modern city meets the old one."
                .to_string(),
            cover_image: unsplash("photo-1545893835-abaa50cbe628", 1000),
            card_cover_image: None,
            cover_title: None,
            hover_location: None,
            photos: vec![
                placeholder_photo("1-1", "photo-1545893835-abaa50cbe628", "The Bund at night", 1333),
                placeholder_photo("1-2", "photo-1548919973-5cef591cdbc9", "Shanghai lane", 1500),
            ],
            created_at: "2023-12-01".to_string(),
            geo: Some(GeoInfo {
                continent: Continent::Asia,
                country: "China".to_string(),
                country_code: "CN".to_string(),
                city: "Shanghai".to_string(),
                lat: 31.2304,
                lng: 121.4737,
            }),
            order: None,
        },
        PhotoCollection {
            id: "2".to_string(),
            title: "2025 Budapest".to_string(),
            location: "Budapest".to_string(),
            year: 2025,
            description: "The pearl of the Danube, from parliament to the thermal baths."
                .to_string(),
            cover_image: unsplash("photo-1541849546-216549ae216d", 1000),
            card_cover_image: None,
            cover_title: None,
            hover_location: None,
            photos: vec![placeholder_photo(
                "2-1",
                "photo-1541849546-216549ae216d",
                "Hungarian Parliament",
                1333,
            )],
            created_at: "2025-01-15".to_string(),
            geo: Some(GeoInfo {
                continent: Continent::Europe,
                country: "Hungary".to_string(),
                country_code: "HU".to_string(),
                city: "Budapest".to_string(),
                lat: 47.4979,
                lng: 19.0402,
            }),
            order: None,
        },
    ]
}
