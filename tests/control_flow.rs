mod common;

use common::run;

#[test]
fn test_if_takes_true_branch() {
    let source = "if 1 < 2:\n  print 'yes'\nelse:\n  print 'no'\n";
    assert_eq!(run(source), "yes\n");
}

#[test]
fn test_if_takes_else_branch() {
    let source = "if 2 < 1:\n  print 'yes'\nelse:\n  print 'no'\n";
    assert_eq!(run(source), "no\n");
}

#[test]
fn test_if_without_else_skips() {
    let source = "if False:\n  print 'hidden'\nprint 'after'\n";
    assert_eq!(run(source), "after\n");
}

#[test]
fn test_guarded_division() {
    let source = "x = 10\ny = 0\nif y == 0:\n  print 'safe'\nelse:\n  print x / y\n";
    assert_eq!(run(source), "safe\n");

    let source = "x = 10\ny = 2\nif y == 0:\n  print 'safe'\nelse:\n  print x / y\n";
    assert_eq!(run(source), "5\n");
}

#[test]
fn test_nested_if() {
    let source = "\
a = 5
if a > 0:
  if a > 3:
    print 'big'
  else:
    print 'small'
else:
  print 'negative'
";
    assert_eq!(run(source), "big\n");
}

#[test]
fn test_multiple_statements_in_branch() {
    let source = "\
if True:
  print 'one'
  print 'two'
print 'three'
";
    assert_eq!(run(source), "one\ntwo\nthree\n");
}

#[test]
fn test_branch_assignments_touch_enclosing_scope() {
    // if/else bodies are not a new scope; they share the program scope
    let source = "\
x = 1
if True:
  x = 2
print x
";
    assert_eq!(run(source), "2\n");
}

#[test]
fn test_condition_from_variable() {
    assert_eq!(run("ok = 3 > 1\nif ok:\n  print 'passed'\n"), "passed\n");
}

#[test]
fn test_or_short_circuits_method_call() {
    // the right operand must not run when the left settles the answer
    let source = "\
class Probe:
  def touch(self_name):
    print 'touched', self_name
    return True
p = Probe()
if True or p.touch('right'):
  print 'done'
";
    assert_eq!(run(source), "done\n");
}

#[test]
fn test_or_evaluates_right_when_needed() {
    let source = "\
class Probe:
  def touch(self_name):
    print 'touched', self_name
    return True
p = Probe()
if False or p.touch('right'):
  print 'done'
";
    assert_eq!(run(source), "touched right\ndone\n");
}

#[test]
fn test_and_short_circuits_method_call() {
    let source = "\
class Probe:
  def touch(self_name):
    print 'touched', self_name
    return True
p = Probe()
if False and p.touch('right'):
  print 'then'
else:
  print 'else'
";
    assert_eq!(run(source), "else\n");
}

#[test]
fn test_and_evaluates_right_when_needed() {
    let source = "\
class Probe:
  def touch(self_name):
    print 'touched', self_name
    return True
p = Probe()
if True and p.touch('right'):
  print 'done'
";
    assert_eq!(run(source), "touched right\ndone\n");
}

#[test]
fn test_stringify_never_writes_output() {
    // str(x) goes through __str__ but produces no output of its own
    let source = "\
class Quiet:
  def __str__():
    return 'quiet'
q = Quiet()
s = str(q)
print 'end', s
";
    assert_eq!(run(source), "end quiet\n");
}
