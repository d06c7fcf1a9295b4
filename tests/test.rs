mod common;
use common::*;

testit!(tests__fixtures__include, |env| {
    assert!(env.run().is_ok());
    env.assert_file_eq("out.txt", "main.txt.expected");

    // includes are resolved from the directory of the including file
    env.cfg().inputs = vec!["lib/util.txt".to_string()];
    assert!(env.run().is_ok());
    env.assert_file_content("out.txt", "common\nutil\n");

    env.cfg().inputs = vec![];
    assert!(env.run().is_err());
    env.cfg().inputs = vec!["lib".to_string()];
    assert!(env.run().is_err());
});

testit!(tests__fixtures__conditional, |env| {
    env.cfg().definitions = vec!["DEBUG".to_string()];
    assert!(env.run().is_ok());
    env.assert_file_eq("out.txt", "debug.expected");

    env.cfg().definitions = vec!["RELEASE".to_string()];
    assert!(env.run().is_ok());
    env.assert_file_eq("out.txt", "release.expected");

    env.cfg().definitions = vec!["DEBUG".to_string(), "VERBOSE".to_string()];
    assert!(env.run().is_ok());
    env.assert_file_eq("out.txt", "verbose.expected");
});

testit!(tests__fixtures__inline, |env| {
    assert!(env.run().is_ok());
    env.assert_file_eq("out.txt", "main.txt.expected");
});

testit!(tests__fixtures__missing_include, |env| {
    assert!(env.run().is_err());
    env.assert_path_exists("out.txt", false);
    // fixing the include makes the run succeed
    env.set_file("nope.txt", "found");
    assert!(env.run().is_ok());
    env.assert_file_content("out.txt", "found\nbefore\nafter\n");
});

testit!(tests__fixtures__diagnostic, |env| {
    assert!(env.run().is_err());
    env.assert_path_exists("out.txt", false);
    env.cfg().definitions = vec!["ALLOWED".to_string()];
    assert!(env.run().is_ok());
    env.assert_file_eq("out.txt", "main.txt.expected");
});

testit!(tests__fixtures__settings, |env| {
    env.cfg().settings = vec![
        "cond:if=%if".to_string(),
        "cond:else=%else".to_string(),
        "cond:endif=%endif".to_string(),
        "inc:include=@use".to_string(),
    ];
    assert!(env.run().is_ok());
    env.assert_file_eq("out.txt", "main.txt.expected");

    env.cfg().settings = vec!["cond:stage=later".to_string()];
    assert!(env.run().is_err());
});

testit!(tests__fixtures__line_ending, |env| {
    env.set_file("main.txt", "a\r\n#include lf.txt\r\nb\r\n");
    assert!(env.run().is_ok());
    env.assert_file_content("out.txt", "included\r\na\r\nb\r\n");

    env.cfg().trailing_newline = false;
    assert!(env.run().is_ok());
    env.assert_file_content("out.txt", "included\r\na\r\nb");
});
