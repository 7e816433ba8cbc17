use crate::*;
use serde_json::{Value, json};

/// Provider returning the same two bytes for every value.
struct FixedProvider;

impl EncryptionProvider for FixedProvider {
    fn encrypt(&self, _width: EncryptionWidth, value: u64) -> Result<Vec<u8>, EncryptError> {
        Ok(vec![0xAB, value as u8])
    }
}

struct FailingProvider;

impl EncryptionProvider for FailingProvider {
    fn encrypt(&self, _width: EncryptionWidth, _value: u64) -> Result<Vec<u8>, EncryptError> {
        Err(EncryptError::Backend("no public key".into()))
    }
}

fn assemble(fields: &[FieldInput], provider: Option<&dyn EncryptionProvider>) -> String {
    ArgumentEncoder::new(provider).assemble(fields).unwrap()
}

// ---------------------- normalizer ----------------------

#[test]
fn normalizer_quotes_bare_literals() {
    assert_eq!(normalize_value("42"), r#""42""#);
    assert_eq!(normalize_value("0xdeadBEEF"), r#""0xdeadBEEF""#);
    assert_eq!(normalize_value("0X1f"), r#""0X1f""#);
    assert_eq!(normalize_value(""), "");
}

#[test]
fn normalizer_leaves_json_untouched() {
    assert_eq!(normalize_value(r#""hello""#), r#""hello""#);
    assert_eq!(normalize_value("true"), "true");
    assert_eq!(normalize_value("[1,2]"), "[1,2]");
    assert_eq!(normalize_value(r#"["0x01", "b"]"#), r#"["0x01", "b"]"#);
    assert_eq!(normalize_value(r#"{"a":1}"#), r#"{"a":1}"#);
}

#[test]
fn normalizer_wraps_plain_text() {
    assert_eq!(normalize_value("hello"), r#""hello""#);
    assert_eq!(normalize_value("12abc"), r#""12abc""#);
    // internal comma breaks the digit pattern; the raw text is quoted whole
    assert_eq!(normalize_value("1,000"), r#""1,000""#);
    // quotes inside the value cannot break the array
    assert_eq!(normalize_value(r#"say "hi""#), r#""say \"hi\"""#);
}

#[test]
fn normalizer_output_is_always_json() {
    for raw in ["1, 2", "a,b", "0x", "-5", "1e3", " ", "[1,", r#"\"#] {
        let out = normalize_value(raw);
        assert!(
            serde_json::from_str::<Value>(&out).is_ok(),
            "{raw:?} -> {out:?}"
        );
    }
}

// ---------------------- substitution ----------------------

#[test]
fn substitution_skips_when_not_applicable() {
    let p: &dyn EncryptionProvider = &FixedProvider;
    assert_eq!(substitute("7", EncryptionWidth::None, Some(p)), Substitution::Unchanged);
    assert_eq!(substitute("7", EncryptionWidth::U8, None), Substitution::Unchanged);
    assert_eq!(substitute("0x07", EncryptionWidth::U8, Some(p)), Substitution::Unchanged);
    assert_eq!(substitute("", EncryptionWidth::U8, Some(p)), Substitution::Unchanged);
}

#[test]
fn substitution_renders_lowercase_hex() {
    let p: &dyn EncryptionProvider = &FixedProvider;
    assert_eq!(
        substitute("7", EncryptionWidth::U8, Some(p)),
        Substitution::Encrypted("0xab07".into())
    );
    assert_eq!(
        substitute("true", EncryptionWidth::Bool, Some(p)),
        Substitution::Encrypted("0xab01".into())
    );
}

#[test]
fn substitution_reports_failures() {
    let p: &dyn EncryptionProvider = &FixedProvider;
    assert!(matches!(
        substitute("seven", EncryptionWidth::U8, Some(p)),
        Substitution::Failed(EncryptError::NotNumeric(_))
    ));
    assert!(matches!(
        substitute("300", EncryptionWidth::U8, Some(p)),
        Substitution::Failed(EncryptError::OutOfRange { .. })
    ));
    let f: &dyn EncryptionProvider = &FailingProvider;
    assert!(matches!(
        substitute("7", EncryptionWidth::U8, Some(f)),
        Substitution::Failed(EncryptError::Backend(_))
    ));
}

// ---------------------- assembler ----------------------

#[test]
fn all_empty_fields_assemble_to_empty_string() {
    assert_eq!(assemble(&[], None), "");
    let fields = [
        FieldInput::plain(""),
        FieldInput::encrypted("", EncryptionWidth::U8),
    ];
    assert_eq!(assemble(&fields, Some(&FixedProvider)), "");
}

#[test]
fn plain_decimal_is_quoted() {
    assert_eq!(assemble(&[FieldInput::plain("42")], None), r#""42""#);
}

#[test]
fn hex_field_is_identical_for_every_width() {
    let expected = assemble(&[FieldInput::plain("0x1234")], None);
    for w in [
        EncryptionWidth::Bool,
        EncryptionWidth::U8,
        EncryptionWidth::U16,
        EncryptionWidth::U32,
    ] {
        let got = assemble(&[FieldInput::encrypted("0x1234", w)], Some(&FixedProvider));
        assert_eq!(got, expected);
    }
    assert_eq!(expected, r#""0x1234""#);
}

#[test]
fn encrypted_field_becomes_quoted_ciphertext() {
    let out = assemble(
        &[FieldInput::encrypted("7", EncryptionWidth::U8)],
        Some(&FixedProvider),
    );
    assert_eq!(out, r#""0xab07""#);
    assert_ne!(out, r#""7""#);
}

#[test]
fn failed_encryption_falls_back_to_plaintext() {
    let out = assemble(
        &[FieldInput::encrypted("7", EncryptionWidth::U8)],
        Some(&FailingProvider),
    );
    assert_eq!(out, r#""7""#);
}

#[test]
fn reject_policy_names_the_field() {
    let fields = [
        FieldInput::plain("1"),
        FieldInput::encrypted("7", EncryptionWidth::U8),
    ];
    let err = ArgumentEncoder::new(Some(&FailingProvider))
        .with_policy(EncryptionFailurePolicy::Reject)
        .assemble(&fields)
        .unwrap_err();
    assert!(matches!(err, ArgsError::Encryption { index: 1, .. }));
}

#[test]
fn reject_policy_without_provider_sends_plaintext() {
    let out = ArgumentEncoder::new(None)
        .with_policy(EncryptionFailurePolicy::Reject)
        .assemble(&[FieldInput::encrypted("7", EncryptionWidth::U8)])
        .unwrap();
    assert_eq!(out, r#""7""#);
}

#[test]
fn internal_comma_stays_in_one_field() {
    let fields = [FieldInput::plain("1,000"), FieldInput::plain("")];
    assert_eq!(assemble(&fields, None), r#""1,000","#);
}

#[test]
fn plain_values_round_trip_in_order() {
    let fields = [
        FieldInput::plain("42"),
        FieldInput::plain("hello"),
        FieldInput::plain("0xabc"),
        FieldInput::plain("[1,2]"),
        FieldInput::plain("true"),
    ];
    let body = assemble(&fields, None);
    let parsed = parse_argument_list(&body).unwrap();
    assert_eq!(
        parsed,
        vec![json!("42"), json!("hello"), json!("0xabc"), json!([1, 2]), json!(true)]
    );
}

#[test]
fn parse_rejects_broken_lists() {
    assert!(matches!(
        parse_argument_list(r#""1",,"2""#),
        Err(ArgsError::Malformed(_))
    ));
    assert_eq!(parse_argument_list("").unwrap(), Vec::<Value>::new());
}

// ---------------------- basic input ----------------------

#[test]
fn split_respects_quotes_and_brackets() {
    let parts = split_basic_input(r#"42, "a,b", [1, 2], 0xff, "say \"hi\"""#).unwrap();
    assert_eq!(
        parts,
        vec!["42", r#""a,b""#, "[1, 2]", "0xff", r#""say \"hi\"""#]
    );
    assert!(split_basic_input("   ").unwrap().is_empty());
}

#[test]
fn split_rejects_unbalanced_input() {
    assert!(matches!(split_basic_input("[1, 2"), Err(ArgsError::Malformed(_))));
    assert!(matches!(split_basic_input("1]"), Err(ArgsError::Malformed(_))));
    assert!(matches!(split_basic_input(r#""abc"#), Err(ArgsError::Malformed(_))));
}

#[test]
fn split_then_assemble_round_trip() {
    let parts = split_basic_input(r#"7, "hello", [1,2]"#).unwrap();
    let fields = collect_fields(&parts, &[]);
    let body = assemble(&fields, None);
    assert_eq!(
        parse_argument_list(&body).unwrap(),
        vec![json!("7"), json!("hello"), json!([1, 2])]
    );
}

#[test]
fn quoted_tokens_stay_strings_after_split() {
    let parts = split_basic_input(r#""true", "[1,2]", "hello", "a,b""#).unwrap();
    let body = assemble(&collect_fields(&parts, &[]), None);
    assert_eq!(
        parse_argument_list(&body).unwrap(),
        vec![json!("true"), json!("[1,2]"), json!("hello"), json!("a,b")]
    );
}

#[test]
fn split_rejects_text_after_closing_quote() {
    assert!(matches!(
        split_basic_input(r#""a"b, 1"#),
        Err(ArgsError::Malformed(_))
    ));
}

// ---------------------- form helpers ----------------------

#[test]
fn collect_fields_defaults_missing_widths() {
    let fields = collect_fields(&["1", "2"], &[EncryptionWidth::U16]);
    assert_eq!(fields[0].width, EncryptionWidth::U16);
    assert_eq!(fields[1].width, EncryptionWidth::None);
}

#[test]
fn fill_fields_skips_empty_values() {
    let mut fields = vec!["old0".to_string(), "old1".to_string(), "old2".to_string()];
    fill_fields(&mut fields, &["a".to_string(), String::new()]);
    assert_eq!(fields, vec!["a", "old1", "old2"]);
}

#[test]
fn reencrypt_fields_are_written_in_place() {
    let mut fields = vec![String::new(); 3];
    let slots = ReencryptSlots {
        public_key: 1,
        signature: 2,
    };
    fill_reencrypt_fields(&mut fields, slots, "0xaa", "0xsig").unwrap();
    assert_eq!(fields, vec!["", "0xaa", "0xsig"]);

    let bad = ReencryptSlots {
        public_key: 0,
        signature: 3,
    };
    assert!(matches!(
        fill_reencrypt_fields(&mut fields, bad, "0xaa", "0xsig"),
        Err(ArgsError::FieldIndex { index: 3, len: 3 })
    ));
}

// ---------------------- encode entry points ----------------------

/// Records what it was asked to encode.
struct EchoEncoder;

impl AbiEncoder for EchoEncoder {
    type Error = String;

    fn encode_call(
        &self,
        func: &FunctionSpec,
        args: &[Value],
        deploy_bytecode: Option<&str>,
    ) -> Result<String, String> {
        if args.len() != func.inputs.len() {
            return Err(format!("expected {} args", func.inputs.len()));
        }
        Ok(format!("{}|{}", deploy_bytecode.unwrap_or("-"), Value::from(args.to_vec())))
    }

    fn encode_params(&self, _func: &FunctionSpec, args: &[Value]) -> Result<String, String> {
        Ok(Value::from(args.to_vec()).to_string())
    }
}

fn spec(kind: &str, inputs: usize) -> FunctionSpec {
    let inputs: Vec<Value> = (0..inputs)
        .map(|i| json!({ "name": format!("a{i}"), "type": "uint256" }))
        .collect();
    serde_json::from_value(json!({ "name": "f", "type": kind, "inputs": inputs })).unwrap()
}

#[test]
fn function_spec_parses_abi_fragment() {
    let f = spec("constructor", 2);
    assert_eq!(f.kind, FunctionKind::Constructor);
    assert_eq!(f.inputs[1].ty, "uint256");
    assert!(f.accepts_arguments());
    assert!(spec("receive", 0).accepts_arguments());
    assert!(!spec("function", 0).accepts_arguments());
}

#[test]
fn encoded_call_refuses_empty_arguments() {
    let err = encoded_call(&EchoEncoder, &spec("function", 1), "", None).unwrap_err();
    assert!(matches!(err, ArgsError::EmptyArguments));
    assert_eq!(err.to_string(), "cannot encode empty arguments");
}

#[test]
fn bytecode_only_reaches_constructors() {
    let out = encoded_call(&EchoEncoder, &spec("function", 1), r#""1""#, Some("0x6080")).unwrap();
    assert_eq!(out, r#"-|["1"]"#);
    let out = encoded_call(&EchoEncoder, &spec("constructor", 1), r#""1""#, Some("0x6080")).unwrap();
    assert_eq!(out, r#"0x6080|["1"]"#);
}

#[test]
fn encoder_errors_are_surfaced() {
    let err = encoded_call(&EchoEncoder, &spec("function", 2), r#""1""#, None).unwrap_err();
    assert!(matches!(err, ArgsError::Abi(ref m) if m == "expected 2 args"));
    assert_eq!(
        encoded_params(&EchoEncoder, &spec("function", 1), r#""1""#).unwrap(),
        r#"["1"]"#
    );
}

// ---------------------- config ----------------------

#[test]
fn config_defaults_to_plaintext_fallback() {
    assert_eq!(
        EncoderConfig::from_json_str("{}").unwrap().failure_policy,
        EncryptionFailurePolicy::FallbackToPlaintext
    );
    let cfg = EncoderConfig::from_json_str(r#"{ "failurePolicy": "reject" }"#).unwrap();
    assert_eq!(cfg.failure_policy, EncryptionFailurePolicy::Reject);
    assert_eq!(
        ArgumentEncoder::with_config(None, &cfg).policy(),
        EncryptionFailurePolicy::Reject
    );
    assert!(EncoderConfig::from_json_str(r#"{ "policy": 1 }"#).is_err());
}

#[test]
fn config_file_errors_name_the_path() {
    let err = EncoderConfig::from_json_file("/nonexistent/encoder.json").unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
    assert!(err.to_string().contains("/nonexistent/encoder.json"));
}
