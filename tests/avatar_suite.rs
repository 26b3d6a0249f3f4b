use std::sync::Arc;

use letter_avatar::{
    AvatarEngine, AvatarError, Catalog, Color, FontPolicy, RawParams, Rasterizer,
};

fn engine_with(catalog: Arc<Catalog>) -> AvatarEngine {
    let rasterizer = Rasterizer::new(&FontPolicy::System).expect("system fonts");
    AvatarEngine::new(catalog, rasterizer)
}

fn render(engine: &AvatarEngine, query: &str) -> letter_avatar::Result<letter_avatar::ResolvedAvatar> {
    engine.render(&RawParams::from_query(query))
}

#[test]
fn scenarios() {
    let engine = engine_with(Catalog::builtin());

    let ada = render(&engine, "name=Ada%20Lovelace").unwrap();
    assert_eq!(ada.letters, "AL");
    assert!(ada.svg_markup.contains("<rect x=\"0\" y=\"0\" width=\"300\" height=\"300\""));
    let expected = engine.catalog().resolve("Ada Lovelace", None).unwrap();
    assert_eq!(&ada.color, expected);

    let err = render(&engine, "name=").unwrap_err();
    assert_eq!(err.status_code(), 400);
    assert!(err.body().message.contains("Name parameter is required"));

    let bob = render(&engine, "name=bob&color=purple").unwrap();
    assert_eq!(bob.color.name, "purple");

    let x = render(&engine, "name=x&letterCount=2").unwrap();
    assert_eq!(x.letters, "X");

    let grace_svg = render(&engine, "name=Grace%20Hopper&format=svg").unwrap();
    assert_eq!(grace_svg.content_type, "image/svg+xml");
    assert!(!grace_svg.svg_markup.contains("<!--"));
    assert!(grace_svg.svg_markup.contains(">GH</text>"));

    let grace_png = render(&engine, "name=Grace%20Hopper&format=png").unwrap();
    assert_eq!(grace_png.content_type, "image/png");
    assert!(grace_png.payload().starts_with(&[0x89, b'P', b'N', b'G']));

    let grace_jpeg = render(&engine, "name=Grace%20Hopper&format=jpeg&shape=circle").unwrap();
    assert_eq!(grace_jpeg.content_type, "image/jpeg");
    assert!(grace_jpeg.payload().starts_with(&[0xFF, 0xD8]));
}

#[test]
fn svg_and_png_are_byte_identical_across_engines() {
    let first = engine_with(Catalog::builtin());
    let second = engine_with(Catalog::builtin());
    for query in [
        "name=Ada%20Lovelace&format=svg",
        "name=Ada%20Lovelace&shape=circle&format=png",
    ] {
        assert_eq!(
            render(&first, query).unwrap().payload(),
            render(&second, query).unwrap().payload(),
            "{query}"
        );
    }
}

#[test]
fn custom_catalog_is_injected() {
    let catalog = Catalog::new(vec![
        Color::new("ink", "#111111", "#EEEEEE"),
        Color::new("paper", "#EEEEEE", "#111111"),
    ])
    .unwrap();
    let engine = engine_with(Arc::new(catalog));
    // 'A' == 65, 65 % 2 == 1
    let avatar = render(&engine, "name=A&format=svg").unwrap();
    assert_eq!(avatar.color.name, "paper");
    // Names from the default palette are unknown here and fall back to the digest.
    let avatar = render(&engine, "name=A&color=purple&format=svg").unwrap();
    assert_eq!(avatar.color.name, "paper");
}

#[test]
fn concurrent_renders_share_one_engine() {
    let engine = engine_with(Catalog::builtin());
    let names = ["Ada Lovelace", "Grace Hopper", "Alan Turing", "Edsger Dijkstra"];
    let results: Vec<Vec<u8>> = std::thread::scope(|scope| {
        let handles: Vec<_> = names
            .iter()
            .map(|name| {
                let engine = &engine;
                scope.spawn(move || {
                    engine
                        .render(&RawParams::with_name(name))
                        .unwrap()
                        .into_payload()
                })
            })
            .collect();
        handles.into_iter().map(|handle| handle.join().unwrap()).collect()
    });
    for (name, bytes) in names.iter().zip(&results) {
        let again = engine.render(&RawParams::with_name(name)).unwrap();
        assert_eq!(again.payload(), bytes.as_slice(), "{name}");
    }
}

#[test]
fn render_avatar_validates_first() {
    let err = letter_avatar::render_avatar(&RawParams::default()).unwrap_err();
    assert!(matches!(err, AvatarError::MissingName));
}
