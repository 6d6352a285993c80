use probe_catalog::error::RequestError;
use probe_catalog::request::{escape_for_json, RequestTemplate, Substitutions};
use probe_catalog::Modality;

const TEXT_TEMPLATE: &str = "
POST https://api.openai.com/v1/chat/completions
Authorization: Bearer $OPENAI_API_KEY
Content-Type: application/json

{
\"messages\": [{\"role\": \"user\", \"content\": \"<<PROMPT>>\"}]
}
";

#[test]
fn parses_request_line_headers_and_body() {
    let template: RequestTemplate = TEXT_TEMPLATE.parse().unwrap();
    assert_eq!(template.method, "POST");
    assert_eq!(template.url, "https://api.openai.com/v1/chat/completions");
    assert_eq!(template.headers.len(), 2);
    assert_eq!(template.headers["Content-Type"], "application/json");
    assert_eq!(
        template.body,
        "{\n\"messages\": [{\"role\": \"user\", \"content\": \"<<PROMPT>>\"}]\n}"
    );
    assert_eq!(template.modality(), Modality::Text);
}

#[test]
fn detects_modalities() {
    let image = RequestTemplate::parse(
        "POST http://h/img\nContent-Type: application/json\n\n{\"url\": \"<<BASE64_IMAGE>>\"}",
    )
    .unwrap();
    assert!(image.has_image);
    assert_eq!(image.modality(), Modality::Image);

    let audio =
        RequestTemplate::parse("POST http://h/a\n\n{\"audio\": \"<<BASE64_AUDIO>>\"}").unwrap();
    assert_eq!(audio.modality(), Modality::Audio);

    let files = RequestTemplate::parse(
        "POST http://h/f\nContent-Type: multipart/form-data\n\n{\"file\": \"@a.m4a\"}",
    )
    .unwrap();
    assert!(files.has_files);
    assert_eq!(files.modality(), Modality::Files);

    // The multipart marker only counts in the Content-Type header.
    let body_only =
        RequestTemplate::parse("POST http://h/f\n\nmultipart/form-data").unwrap();
    assert!(!body_only.has_files);
}

#[test]
fn blank_body_lines_are_dropped() {
    let template =
        RequestTemplate::parse("POST http://h/x\nContent-Type: application/json\n\n{\n\n\"p\": 1\n\n}")
            .unwrap();
    assert_eq!(template.body, "{\n\"p\": 1\n}");
    assert_eq!(template.headers.len(), 1);
}

#[test]
fn header_with_repeated_separator_is_rejected() {
    assert_eq!(
        RequestTemplate::parse("POST http://h/x\nA: b: c\n\n{}"),
        Err(RequestError::InvalidHeader("A: b: c".to_string()))
    );
    let colon_in_value = RequestTemplate::parse("POST http://h/x\nHost: h:8718\n\n{}").unwrap();
    assert_eq!(colon_in_value.headers["Host"], "h:8718");
}

#[test]
fn untagged_multipart_template_reports_files() {
    let template = RequestTemplate::parse(
        "POST http://h/upload\nAuthorization: Bearer x\nContent-Type: multipart/form-data\n\n{\"file\": \"@./sample.m4a\"}",
    )
    .unwrap();
    assert!(template.has_files);
    assert!(!template.has_image);
    assert!(!template.has_audio);
    assert_eq!(template.modality(), Modality::Files);
}

#[test]
fn rejects_malformed_templates() {
    assert_eq!(RequestTemplate::parse("   \n"), Err(RequestError::Empty));
    assert!(matches!(
        RequestTemplate::parse("POST"),
        Err(RequestError::InvalidRequestLine(_))
    ));
    assert_eq!(
        RequestTemplate::parse("POST http://h\nAuthorization Bearer x\n\n{}"),
        Err(RequestError::InvalidHeader("Authorization Bearer x".to_string()))
    );
}

#[test]
fn render_escapes_the_prompt() {
    let template: RequestTemplate = TEXT_TEMPLATE.parse().unwrap();
    let body = template
        .render(&Substitutions {
            prompt: "say \"hi\"\nnow",
            ..Default::default()
        })
        .unwrap();
    assert!(body.contains(r#""content": "say \"hi\"\nnow""#));
    let parsed: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(parsed["messages"][0]["content"], "say \"hi\"\nnow");
}

#[test]
fn render_requires_media_payloads() {
    let image =
        RequestTemplate::parse("POST http://h\n\n{\"p\": \"<<PROMPT>>\", \"i\": \"<<BASE64_IMAGE>>\"}")
            .unwrap();
    assert_eq!(
        image.render(&Substitutions {
            prompt: "test",
            ..Default::default()
        }),
        Err(RequestError::MissingImage)
    );
    let body = image
        .render(&Substitutions {
            prompt: "test",
            encoded_image: Some("data:image/jpeg;base64,AAAA"),
            encoded_audio: None,
        })
        .unwrap();
    assert_eq!(body, "{\"p\": \"test\", \"i\": \"data:image/jpeg;base64,AAAA\"}");

    let audio = RequestTemplate::parse("POST http://h\n\n<<BASE64_AUDIO>>").unwrap();
    assert_eq!(
        audio.render(&Substitutions {
            prompt: "test",
            encoded_audio: Some(""),
            ..Default::default()
        }),
        Err(RequestError::MissingAudio)
    );

    let files =
        RequestTemplate::parse("POST http://h\nContent-Type: multipart/form-data\n\n{}").unwrap();
    assert_eq!(
        files.render(&Substitutions::default()),
        Err(RequestError::FilesNotSupported)
    );
}

#[test]
fn escape_leaves_plain_text_alone() {
    assert_eq!(escape_for_json("plain text"), "plain text");
    assert_eq!(escape_for_json(""), "");
}
