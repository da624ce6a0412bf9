// Round-trip tests: rendered output re-parses to the same tree

use harpy::render::Render;

fn assert_round_trip(source: &str) {
    let first = harpy::parse(source).expect("Parsing failed");
    let printed = first.render();
    let second = harpy::parse(&printed)
        .unwrap_or_else(|e| panic!("Re-parsing failed: {}\n--- rendered ---\n{}", e, printed));
    assert_eq!(first, second, "rendered:\n{}", printed);
}

#[test]
fn test_definitions() {
    assert_round_trip("function a(b)\n local c := b\nreturn c");
    assert_round_trip("STATIC PROCEDURE Main()\n  x := 1\nRETURN");
    assert_round_trip("static function f(a, b, c)\nreturn a + b * c");
}

#[test]
fn test_operator_precedence_survives() {
    assert_round_trip("x := a + b * c - d / e % f");
    assert_round_trip("x := (a + b) * c");
    assert_round_trip("x := a ^ b ^ c");
    assert_round_trip("x := y := z");
    assert_round_trip("x := !a .and. b .or. c # d");
    assert_round_trip("x := 'a' $ s .and. n >= 1 .and. n != 2");
    assert_round_trip("x := -a ^ 2");
    assert_round_trip("x := - -a");
}

#[test]
fn test_increments() {
    assert_round_trip("i++\n--j\nk[1]++");
    assert_round_trip("x := -i++");
}

#[test]
fn test_postfix_chains() {
    assert_round_trip("a(b)(c)");
    assert_round_trip("x := a:b()[1]");
    assert_round_trip("x := a[1, 2][3]");
    assert_round_trip("o:p:q := @r");
    assert_round_trip("o:End()");
}

#[test]
fn test_containers() {
    assert_round_trip("x := {}");
    assert_round_trip("x := {=>}");
    assert_round_trip("x := {1, {2, 3}, 'four'}");
    assert_round_trip("x := {'a' => 1, 2 => {3}}");
    assert_round_trip("x := {|| nil}");
    assert_round_trip("x := {|a, b| a := a + b, a}");
    assert_round_trip("x := {1, 2}[1]");
    assert_round_trip("x := iif(a > b, a, b)");
}

#[test]
fn test_literals() {
    assert_round_trip("x := \"double\" + 'single' + [bracket]");
    assert_round_trip("x := 0x1F + .5 + 10.25");
    assert_round_trip("x := .T. .or. .f. .and. nil == nil");
}

#[test]
fn test_control_flow() {
    let source = r#"
procedure Loop(n)
   local i := 0
   while i < n
      if i % 2 == 0
         Even(i)
      elseif i % 3 == 0
         Third(i)
      else
         if i > 10
            return
         endif
      endif
      i++
   end
return
"#;
    assert_round_trip(source);
}

#[test]
fn test_comments_and_directives() {
    let source = r#"
#include "inkey.ch"
#ifdef __HARBOUR__
// line comment
function f()
   /* block
      comment */
   local x := 1 // trailing
return x
#endif
"#;
    assert_round_trip(source);
}
