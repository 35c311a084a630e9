//! Typed command trees for Bevy.
//!
//! bevy_commander matches argument lists against registered command paths,
//! extracts typed values, and dispatches them to handlers, either on the
//! calling thread or on a bevy task pool.
//!
//! - **Argument**: one position of a path (literal, plural, boolean, integer,
//!   number, string, take-all or a custom kind)
//! - **Entry**: a registered path with its composite pattern and signature
//! - **Commander**: a compiled command that selects, gates and runs handlers
//! - **Completion**: next-token suggestions and matching signatures
//!
//! # Selection
//!
//! For each input the first entry that consumes it exactly wins. When no entry
//! is exact, the first entry that matched a prefix wins. When nothing matches,
//! the default handler runs with no values.
//!
//! # Quick Start
//!
//! ```
//! use std::sync::{Arc, Mutex};
//! use bevy_commander::prelude::*;
//!
//! let log = Arc::new(Mutex::new(Vec::<String>::new()));
//! let out = log.clone();
//!
//! let commander = Commander::new(move || {
//!     let give = out.clone();
//!     let fallback = out.clone();
//!     CommandSpec::<()>::new("give")
//!         .alias("g")
//!         .path(
//!             [Argument::string("item"), Argument::integer("count").optional()],
//!             move |_ctx, args| {
//!                 let item = args.string(0).unwrap_or_default();
//!                 let count = args.integer(1).unwrap_or(1);
//!                 give.lock().unwrap().push(format!("{item} x{count}"));
//!                 Ok(())
//!             },
//!         )
//!         .default_handler(move |_ctx, _args| {
//!             fallback.lock().unwrap().push("usage: give <item> [count]".into());
//!             Ok(())
//!         })
//! })
//! .unwrap();
//!
//! assert!(commander.matches_label("G"));
//! commander.execute((), ["apple", "3"]).unwrap();
//! commander.execute((), Vec::<String>::new()).unwrap();
//! assert_eq!(*log.lock().unwrap(), vec!["apple x3", "usage: give <item> [count]"]);
//! ```

pub mod builder;
pub mod commander;
pub mod core;

pub use builder::{ArgumentNode, CommandDefinition, CommandSpec};
pub use commander::Commander;
pub use crate::core::{
    handler, requires, tokenize, tokenize_string, Argument, ArgumentError, ArgumentKind,
    ArgumentType, Arguments, CommandContext, CommandError, CommandLine, CommandTable,
    ContextVars, DispatchHandle, DispatchResult, DispatchStatus, Entry, EntryMatch,
    ErrorHandler, ExecutionGate, ExecutionPool, Handler, HandlerResult, PermissionLevel,
    Permissioned, Predicate, RejectionHandler, Route, TokenizeError, Value,
};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::builder::{ArgumentNode, CommandDefinition, CommandSpec};
    pub use crate::commander::Commander;
    pub use crate::core::{
        requires, Argument, Arguments, CommandContext, CommandError, DispatchStatus,
        ExecutionPool, HandlerResult, PermissionLevel, Permissioned, Value,
    };
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{mpsc, Arc, Mutex};
    use std::time::Duration;

    use super::*;

    /// Sender that remembers the last message it was sent.
    #[derive(Clone, Default)]
    struct Reader(Arc<Mutex<String>>);

    impl Reader {
        fn send(&self, message: impl Into<String>) {
            *self.0.lock().unwrap() = message.into();
        }

        fn result(&self) -> String {
            self.0.lock().unwrap().clone()
        }
    }

    fn reply(message: &'static str) -> impl Fn(&CommandContext<Reader>, &Arguments) -> HandlerResult {
        move |ctx, _| {
            ctx.sender().send(message);
            Ok(())
        }
    }

    fn echo(index: usize, suffix: &'static str) -> impl Fn(&CommandContext<Reader>, &Arguments) -> HandlerResult {
        move |ctx, args| {
            let value = args.get(index).map(Value::to_string).unwrap_or_default();
            ctx.sender().send(format!("{value}{suffix}"));
            Ok(())
        }
    }

    fn example() -> CommandSpec<Reader> {
        CommandSpec::new("test")
            .literal("xyz", |_, _| anyhow::bail!("something broke"))
            .literal("abc", |_, _| anyhow::bail!("potatoes are cool"))
            .literal("foo", reply("foo"))
            .literal("bar", reply("bar"))
            .literal("blob", reply("blob"))
            .literal("bar", reply("blue"))
            .path([Argument::boolean("boolean")], echo(0, ""))
            .path([Argument::literal("blob"), Argument::boolean("boolean")], echo(0, ""))
            .path([Argument::literal("box"), Argument::boolean("boolean")], echo(0, ""))
            .node(
                ArgumentNode::literal("box").then(
                    ArgumentNode::new(Argument::string("string"))
                        .executes(echo(0, "-str"))
                        .then(ArgumentNode::new(Argument::integer("integer")).executes(echo(1, "-int"))),
                ),
            )
            .node(
                ArgumentNode::literal("num").then(
                    ArgumentNode::new(Argument::integer("a"))
                        .executes(echo(0, "+"))
                        .then(ArgumentNode::new(Argument::integer("b")).executes(|ctx: &CommandContext<Reader>, args| {
                            let a = args.integer(0).unwrap_or_default();
                            let b = args.integer(1).unwrap_or_default();
                            ctx.sender().send(format!("{a}{b}++"));
                            Ok(())
                        })),
                ),
            )
            .path([Argument::literal("conflict"), Argument::string("string")], echo(0, "-s"))
            .path([Argument::literal("conflict"), Argument::integer("integer")], echo(0, "-i"))
            .path([Argument::literal("nonconflict"), Argument::integer("integer")], echo(0, "-i"))
            .path([Argument::literal("nonconflict"), Argument::string("string")], echo(0, "-s"))
            .path([Argument::literal("takeall"), Argument::string_take_all("rest")], echo(0, ""))
            .node(
                ArgumentNode::literal("takeafter").then(
                    ArgumentNode::new(Argument::number("number"))
                        .executes(echo(0, ""))
                        .then(ArgumentNode::new(Argument::string_take_all("rest")).executes(echo(1, ""))),
                ),
            )
            .default_handler(reply("default"))
    }

    fn run(commander: &Commander<Reader>, args: &[&str]) -> String {
        let reader = Reader::default();
        commander
            .dispatch(CommandContext::new(reader.clone(), "test", args.iter().copied()))
            .unwrap();
        reader.result()
    }

    fn run_async(commander: &Commander<Reader>, args: &[&str]) -> String {
        let reader = Reader::default();
        let handle = commander
            .dispatch_async(CommandContext::new(reader.clone(), "test", args.iter().copied()))
            .unwrap();
        handle.wait().unwrap();
        reader.result()
    }

    #[test]
    fn test_default_handler() {
        let commander = Commander::new(example).unwrap();
        assert_eq!(run(&commander, &[]), "default");
        assert_eq!(run(&commander, &["nothing", "here"]), "default");
    }

    #[test]
    fn test_simple_args() {
        let commander = Commander::new(example).unwrap();
        assert_eq!(run(&commander, &["foo"]), "foo");
        assert_eq!(run(&commander, &["bar"]), "bar");
        assert_eq!(run(&commander, &["blob"]), "blob");
    }

    #[test]
    fn test_complex_args() {
        let commander = Commander::new(example).unwrap();
        assert_eq!(run(&commander, &["true"]), "true");
        assert_eq!(run(&commander, &["blob", "true"]), "true");
        assert_eq!(run(&commander, &["box", "true"]), "true");
        assert_eq!(run(&commander, &["box", "boo"]), "boo-str");
        assert_eq!(run(&commander, &["box", "boo", "5"]), "5-int");
        assert_eq!(run(&commander, &["num", "1", "5"]), "15++");
        assert_eq!(run(&commander, &["num", "1"]), "1+");
    }

    #[test]
    fn test_registration_order_breaks_ties() {
        let commander = Commander::new(example).unwrap();
        assert_eq!(run(&commander, &["conflict", "1"]), "1-s");
        assert_eq!(run(&commander, &["conflict", "blob"]), "blob-s");
        assert_eq!(run(&commander, &["nonconflict", "1"]), "1-i");
        assert_eq!(run(&commander, &["nonconflict", "blob"]), "blob-s");
    }

    #[test]
    fn test_take_all() {
        let commander = Commander::new(example).unwrap();
        assert_eq!(run(&commander, &["takeall", "hello", "there!"]), "hello there!");
        assert_eq!(run(&commander, &["takeall", "hello there!"]), "hello there!");
        assert_eq!(run(&commander, &["takeafter", "0.5"]), "0.5");
        assert_eq!(run(&commander, &["takeafter", "0.5", "hello", "there!"]), "hello there!");
    }

    #[test]
    fn test_duplicate_path_keeps_first() {
        let commander = Commander::new(example).unwrap();
        assert_eq!(commander.signatures().filter(|s| *s == "bar").count(), 1);
        assert_eq!(run(&commander, &["bar"]), "bar");
    }

    #[test]
    fn test_completions() {
        let commander = Commander::new(example).unwrap();

        let t = commander.next_completions(&["t"]);
        for expected in ["true", "takeall", "takeafter"] {
            assert!(t.contains(&expected.to_string()), "missing {expected} in {t:?}");
        }
        let b = commander.next_completions(&["b"]);
        for expected in ["bar", "box", "blob"] {
            assert!(b.contains(&expected.to_string()), "missing {expected} in {b:?}");
        }
        assert_eq!(commander.next_completions(&["box", "fa"]), vec!["false"]);
        assert!(commander.next_completions(&["zzz"]).is_empty());
    }

    #[test]
    fn test_completions_are_unique() {
        let commander = Commander::new(example).unwrap();
        let all = commander.next_completions(&[]);
        let box_count = all.iter().filter(|c| *c == "box").count();
        assert_eq!(box_count, 1);
        assert!(all.contains(&"false".to_string()));
    }

    #[test]
    fn test_completions_are_case_sensitive() {
        let commander = Commander::new(|| {
            CommandSpec::<()>::new("p")
                .literal("bar", |_, _| Ok(()))
                .literal("Box", |_, _| Ok(()))
        })
        .unwrap();
        assert_eq!(commander.next_completions(&["B"]), vec!["Box"]);
        assert_eq!(commander.next_completions(&["b"]), vec!["bar"]);
        assert!(commander.next_completions(&["BA"]).is_empty());
    }

    fn moderation() -> CommandSpec<()> {
        CommandSpec::new("mod")
            .path(
                [
                    Argument::literal("kick"),
                    Argument::integer("seconds").optional(),
                    Argument::boolean("silent"),
                ],
                |_, _| Ok(()),
            )
            .path(
                [Argument::literal("say"), Argument::string_take_all("message")],
                |_, _| Ok(()),
            )
    }

    #[test]
    fn test_completions_past_optional_position() {
        let commander = Commander::new(moderation).unwrap();
        assert_eq!(commander.next_completions(&["kick", "", "f"]), vec!["false"]);
        assert_eq!(commander.next_completions(&["kick", "soon", "t"]), vec!["true"]);
        assert_eq!(commander.next_completions(&["kick", "30", ""]), vec!["true", "false"]);
        assert_eq!(commander.next_signatures(&["kick", ""]), vec!["kick [seconds] <silent>"]);
    }

    #[test]
    fn test_completions_past_take_all() {
        let commander = Commander::new(moderation).unwrap();
        assert!(commander.next_completions(&["say", "hello", "t"]).is_empty());
        assert_eq!(
            commander.next_signatures(&["say", "hello", "there"]),
            vec!["say <message...>"]
        );
        assert!(commander.next_signatures(&["shout", "hello"]).is_empty());
    }

    #[test]
    fn test_possible_signatures() {
        let commander = Commander::new(example).unwrap();
        assert_eq!(commander.possible_signatures(&[]).len(), commander.table().len());
        assert_eq!(
            commander.possible_signatures(&["box", "true"]),
            vec!["box <boolean>", "box <string>"]
        );
        assert_eq!(commander.possible_signatures(&["num", "1", "2"]), vec!["num <a> <b>"]);
    }

    #[test]
    fn test_next_signatures() {
        let commander = Commander::new(example).unwrap();
        assert_eq!(
            commander.next_signatures(&["num"]),
            vec!["num <a>"]
        );
        assert_eq!(
            commander.next_signatures(&["box"]),
            vec!["box <boolean>", "box <string>"]
        );
        assert_eq!(commander.next_signatures(&["box", "x"]), vec!["box <string> <integer>"]);
    }

    #[test]
    fn test_runtime_failure_propagates() {
        let commander = Commander::new(example).unwrap();
        let err = commander
            .dispatch(CommandContext::new(Reader::default(), "test", ["xyz"]))
            .unwrap_err();
        assert!(err.is_runtime());
        assert!(err.to_string().contains("something broke"));
    }

    #[test]
    fn test_error_handler_receives_failure() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let out = seen.clone();
        let commander = Commander::new(move || {
            let out = out.clone();
            example().error_handler(move |_, err| out.lock().unwrap().push(err.to_string()))
        })
        .unwrap();

        let status = commander
            .dispatch(CommandContext::new(Reader::default(), "test", ["abc"]))
            .unwrap();
        assert_eq!(status, DispatchStatus::Handled);
        assert!(seen.lock().unwrap()[0].contains("potatoes"));
    }

    #[test]
    fn test_handler_panic_is_runtime_failure() {
        let commander = Commander::new(|| {
            CommandSpec::<()>::new("boom").literal("now", |_, _| panic!("kaboom"))
        })
        .unwrap();
        let err = commander.execute((), ["now"]).unwrap_err();
        assert!(err.is_runtime());
        assert!(err.to_string().contains("kaboom"));
    }

    struct Exploding;

    impl ArgumentType for Exploding {
        fn kind(&self) -> &'static str {
            "exploding"
        }

        fn pattern(&self) -> &str {
            r"\w+"
        }

        fn serialize(&self, segment: &str) -> Result<Value, ArgumentError> {
            Err(ArgumentError::new("thing", self.kind(), segment))
        }
    }

    fn exploding() -> CommandSpec<()> {
        CommandSpec::new("parse").path(
            [Argument::literal("go"), Argument::custom("thing", Exploding).unwrap()],
            |_, _| Ok(()),
        )
    }

    #[test]
    fn test_parse_failure() {
        let commander = Commander::new(exploding).unwrap();
        let err = commander.execute((), ["go", "now"]).unwrap_err();
        assert!(err.is_parse());

        let handled = Arc::new(AtomicUsize::new(0));
        let counter = handled.clone();
        let commander = Commander::new(move || {
            let counter = counter.clone();
            exploding().error_handler(move |_, err| {
                assert!(err.is_parse());
                counter.fetch_add(1, Ordering::SeqCst);
            })
        })
        .unwrap();
        assert_eq!(commander.execute((), ["go", "now"]).unwrap(), DispatchStatus::Handled);
        assert_eq!(handled.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_rejection_runs_default_handler() {
        let commander = Commander::new(|| example().predicate(|_| false)).unwrap();
        let reader = Reader::default();
        let status = commander
            .dispatch(CommandContext::new(reader.clone(), "test", ["foo"]))
            .unwrap();
        assert_eq!(status, DispatchStatus::Rejected);
        assert_eq!(reader.result(), "default");
    }

    #[test]
    fn test_rejection_handler_never_sees_errors() {
        let commander = Commander::new(|| {
            example()
                .predicate(|ctx| ctx.args().first().map(String::as_str) != Some("xyz"))
                .on_rejected(|ctx| ctx.sender().send("denied"))
        })
        .unwrap();
        let reader = Reader::default();
        let status = commander
            .dispatch(CommandContext::new(reader.clone(), "test", ["xyz"]))
            .unwrap();
        assert_eq!(status, DispatchStatus::Rejected);
        assert_eq!(reader.result(), "denied");
    }

    #[test]
    fn test_permission_predicate() {
        let commander = Commander::new(|| {
            CommandSpec::<PermissionLevel>::new("kick")
                .predicate_shared(requires(PermissionLevel::Admin))
                .path([Argument::string("player")], |_, _| Ok(()))
        })
        .unwrap();
        assert_eq!(
            commander.execute(PermissionLevel::User, ["bob"]).unwrap(),
            DispatchStatus::Rejected
        );
        assert_eq!(
            commander.execute(PermissionLevel::Server, ["bob"]).unwrap(),
            DispatchStatus::Executed
        );
    }

    #[test]
    fn test_pooled_dispatch() {
        let commander = Commander::new(|| example().pool(ExecutionPool::with_threads(2))).unwrap();
        assert_eq!(run_async(&commander, &[]), "default");
        assert_eq!(run_async(&commander, &["foo"]), "foo");
        assert_eq!(run_async(&commander, &["box", "boo", "5"]), "5-int");
        assert_eq!(run_async(&commander, &["num", "1", "5"]), "15++");
        assert_eq!(run_async(&commander, &["conflict", "1"]), "1-s");
        assert_eq!(run_async(&commander, &["takeafter", "0.5", "hello", "there!"]), "hello there!");
    }

    #[test]
    fn test_pooled_runtime_failure_reaches_handle() {
        let commander = Commander::new(|| example().pool(ExecutionPool::with_threads(1))).unwrap();
        let handle = commander
            .dispatch_async(CommandContext::new(Reader::default(), "test", ["xyz"]))
            .unwrap();
        assert!(handle.wait().unwrap_err().is_runtime());
    }

    #[test]
    fn test_pooled_rejection_resolves() {
        let commander = Commander::new(|| {
            example()
                .predicate(|_| false)
                .pool(ExecutionPool::with_threads(1))
        })
        .unwrap();
        let reader = Reader::default();
        let status = commander
            .dispatch_async(CommandContext::new(reader.clone(), "test", ["foo"]))
            .unwrap()
            .wait()
            .unwrap();
        assert_eq!(status, DispatchStatus::Rejected);
        assert_eq!(reader.result(), "default");
    }

    #[test]
    fn test_async_without_pool_fails_immediately() {
        let commander = Commander::new(example).unwrap();
        let err = commander
            .dispatch_async(CommandContext::new(Reader::default(), "test", ["foo"]))
            .unwrap_err();
        assert!(matches!(err, CommandError::NoPool));
    }

    #[test]
    fn test_async_parse_failure_is_synchronous() {
        let commander = Commander::new(|| exploding().pool(ExecutionPool::with_threads(1))).unwrap();
        let err = commander
            .dispatch_async(CommandContext::new((), "parse", ["go", "now"]))
            .unwrap_err();
        assert!(err.is_parse());
    }

    #[test]
    fn test_blocking_dispatch_with_pool_is_fire_and_forget() {
        let (tx, rx) = mpsc::channel::<String>();
        let commander = Commander::new(move || {
            let tx = tx.clone();
            CommandSpec::<()>::new("bg")
                .literal("go", move |_, _| {
                    tx.send("done".to_string())?;
                    Ok(())
                })
                .pool(ExecutionPool::with_threads(1))
        })
        .unwrap();

        assert_eq!(commander.execute((), ["go"]).unwrap(), DispatchStatus::Scheduled);
        assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), "done");
    }

    #[test]
    fn test_concurrent_contexts() {
        let commander = Arc::new(
            Commander::new(|| example().pool(ExecutionPool::with_threads(4))).unwrap(),
        );
        let handles: Vec<_> = (0..16)
            .map(|i| {
                let reader = Reader::default();
                let n = i.to_string();
                let handle = commander
                    .dispatch_async(CommandContext::new(reader.clone(), "test", ["num", n.as_str()]))
                    .unwrap();
                (reader, handle, format!("{i}+"))
            })
            .collect();

        for (reader, handle, expected) in handles {
            assert_eq!(handle.wait().unwrap(), DispatchStatus::Executed);
            assert_eq!(reader.result(), expected);
        }
    }

    #[test]
    fn test_recompile_rebuilds_table() {
        let generation = Arc::new(AtomicUsize::new(0));
        let counter = generation.clone();
        let mut commander = Commander::new(move || {
            let spec = CommandSpec::<()>::new("hot").literal("one", |_, _| Ok(()));
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                spec
            } else {
                spec.literal("two", |_, _| Ok(()))
            }
        })
        .unwrap();
        assert_eq!(commander.table().len(), 1);
        commander.recompile().unwrap();
        assert_eq!(commander.signatures().collect::<Vec<_>>(), vec!["one", "two"]);
    }

    #[test]
    fn test_context_from_line() {
        let commander = Commander::new(example).unwrap();
        let reader = Reader::default();
        let ctx = CommandContext::parse(reader.clone(), r#"test takeall "hello there!""#).unwrap();
        assert!(commander.matches_label(ctx.label()));
        commander.dispatch(ctx).unwrap();
        assert_eq!(reader.result(), "hello there!");
    }

    #[test]
    fn test_descriptions() {
        let commander = Commander::new(|| {
            CommandSpec::<()>::new("help")
                .description("Show help")
                .described_path([Argument::literal("all")], "List everything", |_, _| Ok(()))
                .literal("short", |_, _| Ok(()))
        })
        .unwrap();
        assert_eq!(commander.description(), Some("Show help"));
        assert_eq!(
            commander.descriptions(),
            vec![("all", Some("List everything")), ("short", None)]
        );
    }

    #[test]
    fn test_empty_label_is_rejected() {
        let err = Commander::new(|| CommandSpec::<()>::new("  ")).unwrap_err();
        assert!(matches!(err, CommandError::Definition(_)));
    }
}
