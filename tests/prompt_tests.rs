use aide_backend::prompt::{compile_prompt_to_md, opt_messages_to_list};
use aide_backend::{Message, Prompt, Role, Section};
use serde_json::json;

fn evaluator_prompt() -> Prompt
{   Prompt::from_sections([
      ("Introduction", Section::from("You are a Kaggle grandmaster."))
    , ("Task description", Section::from("example_tasks/house_prices"))
    , ("Implementation", Section::Omitted)
    , ("Execution output", Section::Omitted)
    ])
}

#[test]
fn test_plain_text_is_verbatim()
{   let prompt = Prompt::text("  say hello  ");
    assert_eq!(compile_prompt_to_md(&prompt), "  say hello  ");
}

#[test]
fn test_sections_render_as_headings()
{   let md = compile_prompt_to_md(&evaluator_prompt());
    assert_eq!(
      md,
      "# Introduction\n\nYou are a Kaggle grandmaster.\n\n\
       # Task description\n\nexample_tasks/house_prices\n"
    );
}

#[test]
fn test_omitted_sections_vanish()
{   let md = compile_prompt_to_md(&evaluator_prompt());
    assert!(!md.contains("Implementation"));
    assert!(!md.contains("Execution output"));
}

#[test]
fn test_nested_sections_go_one_level_deeper()
{   let prompt = Prompt::from_sections([
      ("Task", Section::Nested(vec![
        ("Data".to_string(), Section::from("train.csv"))
      , ("Notes".to_string(), Section::Nested(vec![
          ("Deep".to_string(), Section::from("leaf"))
        , ("Gone".to_string(), Section::Omitted)
        ]))
      ]))
    ]);
    let md = compile_prompt_to_md(&prompt);
    assert!(md.starts_with("# Task\n"));
    assert!(md.contains("## Data\n"));
    assert!(md.contains("## Notes\n"));
    assert!(md.contains("### Deep\n"));
    assert!(!md.contains("Gone"));
    assert!(md.find("train.csv") < md.find("leaf"));
}

#[test]
fn test_leaf_strings_preserved_verbatim()
{   let leaves = [
      "first line\nsecond line"
    , "  padded  "
    , "with # hash and - dash"
    , "trailing newline\n"
    ];
    let prompt = Prompt::from_sections(
      leaves.iter().enumerate()
        .map(|(i, leaf)| (format!("Key {}", i), Section::from(*leaf)))
    );
    let md = compile_prompt_to_md(&prompt);
    for leaf in leaves
    {   assert!(md.contains(leaf), "missing leaf {:?} in {:?}", leaf, md);
    }
}

#[test]
fn test_lists_render_as_bullets()
{   let prompt = Prompt::from_sections([
      ("Steps", Section::from(vec!["load".to_string(), "fit".to_string()]))
    ]);
    assert_eq!(compile_prompt_to_md(&prompt), "# Steps\n\n- load\n- fit\n");
}

#[test]
fn test_from_json_keeps_order_and_nulls()
{   let prompt = Prompt::from_json(json!({
      "Zeta": "last letter",
      "Alpha": null,
      "Beta": { "Inner": "x" },
      "Gamma": ["a", "b"],
    })).expect("object is a prompt");

    match &prompt
    {   Prompt::Sections(entries) => {
          let keys: Vec<&str>
            = entries.iter().map(|(k, _)| k.as_str()).collect();
          assert_eq!(keys, ["Zeta", "Alpha", "Beta", "Gamma"]);
          assert_eq!(entries[1].1, Section::Omitted);
        }
      , other => panic!("expected sections, got {:?}", other)
    }

    let md = prompt.compile();
    assert!(md.find("# Zeta") < md.find("# Beta"));
    assert!(md.contains("## Inner\n"));
    assert!(!md.contains("Alpha"));
}

#[test]
fn test_from_json_null_is_no_prompt()
{   assert_eq!(Prompt::from_json(json!(null)), None);
    assert_eq!(
      Prompt::from_json(json!("hi")),
      Some(Prompt::text("hi"))
    );
}

#[test]
fn test_messages_system_then_user()
{   let system = Prompt::text("be terse");
    let user = evaluator_prompt();
    let messages = opt_messages_to_list(Some(&system), Some(&user));
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0], Message::new(Role::System, "be terse"));
    assert_eq!(messages[1].role, Role::User);
    assert!(messages[1].content.starts_with("# Introduction"));
}

#[test]
fn test_messages_omit_absent_sides()
{   let user = Prompt::text("hello");
    let only_user = opt_messages_to_list(None, Some(&user));
    assert_eq!(only_user, vec![Message::new(Role::User, "hello")]);

    let only_system = opt_messages_to_list(Some(&user), None);
    assert_eq!(only_system, vec![Message::new(Role::System, "hello")]);

    assert!(opt_messages_to_list(None, None).is_empty());
}

#[test]
fn test_messages_skip_empty_content()
{   let empty = Prompt::from_sections([("Nothing", Section::Omitted)]);
    let user = Prompt::text("hi");
    let messages = opt_messages_to_list(Some(&empty), Some(&user));
    assert_eq!(messages, vec![Message::new(Role::User, "hi")]);
    assert!(messages.iter().all(|m| !m.role.as_str().is_empty()));
}

#[test]
fn test_role_serializes_lowercase()
{   let message = Message::new(Role::Assistant, "ok");
    assert_eq!(
      serde_json::to_value(&message).expect("serializable"),
      json!({ "role": "assistant", "content": "ok" })
    );
}
