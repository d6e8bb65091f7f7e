use ideaforge_schema::ImageResult;

pub const PLACEHOLDER_CREDIT: &str = "ideaforge";

const PLACEHOLDERS: &[&str] = &[
    "https://images.unsplash.com/photo-1519389950473-47ba0277781c?w=1200&q=80",
    "https://images.unsplash.com/photo-1498050108023-c5249f4df085?w=1200&q=80",
    "https://images.unsplash.com/photo-1522071820081-009f0129c71c?w=1200&q=80",
    "https://images.unsplash.com/photo-1460925895917-afdab827c52f?w=1200&q=80",
    "https://images.unsplash.com/photo-1551434678-e076c223a692?w=1200&q=80",
    "https://images.unsplash.com/photo-1556761175-b413da4baf72?w=1200&q=80",
];

/// Placeholder picked by a stable hash of the normalized query.
pub fn placeholder_image(query: &str) -> ImageResult {
    let normalized = query.trim().to_lowercase();
    let index = (fnv1a(normalized.as_bytes()) % PLACEHOLDERS.len() as u64) as usize;
    ImageResult {
        url: PLACEHOLDERS[index].to_string(),
        alt: if normalized.is_empty() {
            "Placeholder cover image".to_string()
        } else {
            format!("Cover image for {}", query.trim())
        },
        credit: PLACEHOLDER_CREDIT.to_string(),
        source_url: None,
    }
}

/// FNV-1a; unlike `DefaultHasher` its output is fixed across releases.
fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0xcbf2_9ce4_8422_2325, |hash, b| {
        (hash ^ u64::from(*b)).wrapping_mul(0x0100_0000_01b3)
    })
}
