// The MIT License (MIT)
//
// Copyright (c) 2016 AT&T
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in
// all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN
// THE SOFTWARE.

mod common;

use std::collections::HashMap;
use std::sync::mpsc::channel;
use std::sync::{Arc, Mutex, Weak};
use std::thread;
use std::time::Duration;

use mesos_sched_driver::collaborator::LocalCluster;
use mesos_sched_driver::driver::{DriverError, DriverState, MesosSchedulerDriver, SchedulerDriver};
use mesos_sched_driver::proto::{error_code, FrameworkID, FrameworkMessage, Message, OfferID, SlaveID, SlaveOffer,
                                TaskID, TaskState, TaskStatus};
use mesos_sched_driver::scheduler::{run_scheduler, Scheduler};
use mesos_sched_driver::utils::Params;

use common::*;

#[test]
fn end_to_end_offer_reply_status_stop() {
    let (scheduler, events) = RecordingScheduler::new();
    let h = harness(scheduler, None);

    start_registered(&h, &events);
    match h.transport.sent_named("RegisterFramework")[0] {
        (ref to, Message::RegisterFramework { ref framework }) => {
            assert_eq!(to, MASTER);
            assert_eq!(framework.name, "recording");
            assert_eq!(framework.user, "tester");
        }
        ref other => panic!("unexpected {:?}", other),
    }

    offer(&h, &events, "O1");
    h.driver.reply_to_offer(OfferID::new("O1"), vec![task("T1", "S1")], HashMap::new()).unwrap();

    let replies = h.transport.sent_named("ReplyToOffer");
    assert_eq!(replies.len(), 1);
    match replies[0].1 {
        Message::ReplyToOffer { ref framework_id, ref offer_id, ref tasks, .. } => {
            assert_eq!(*framework_id, FrameworkID::new("F1"));
            assert_eq!(*offer_id, OfferID::new("O1"));
            assert_eq!(tasks[0].task_id, TaskID::new("T1"));
        }
        ref other => panic!("unexpected {:?}", other),
    }

    let running = TaskStatus::new(TaskID::new("T1"), TaskState::Running);
    h.transport.deliver(MASTER, Message::StatusUpdate { status: running.clone() });
    assert_eq!(events.next(), Event::Status(running));

    assert_eq!(h.driver.stop(), Ok(DriverState::Stopped));
    assert_eq!(h.driver.join(), Ok(DriverState::Stopped));
}

#[test]
fn stale_replies_are_rejected_without_sending() {
    let (scheduler, events) = RecordingScheduler::new();
    let h = harness(scheduler, None);
    start_registered(&h, &events);

    offer(&h, &events, "O1");
    h.transport.deliver(MASTER, Message::RescindOffer { offer_id: OfferID::new("O1") });
    assert_eq!(events.next(), Event::Rescinded(OfferID::new("O1")));

    // A second rescission of the same offer is not reported again.
    h.transport.deliver(MASTER, Message::RescindOffer { offer_id: OfferID::new("O1") });
    events.assert_quiet();

    let result = h.driver.reply_to_offer(OfferID::new("O1"), vec![task("T1", "S1")], HashMap::new());
    assert_eq!(result, Err(DriverError::UnknownOffer(OfferID::new("O1"))));

    offer(&h, &events, "O2");
    h.driver.reply_to_offer(OfferID::new("O2"), vec![], HashMap::new()).unwrap();
    let again = h.driver.reply_to_offer(OfferID::new("O2"), vec![], HashMap::new());
    assert_eq!(again, Err(DriverError::UnknownOffer(OfferID::new("O2"))));

    assert_eq!(h.transport.sent_named("ReplyToOffer").len(), 1);
}

#[test]
fn invalid_tasks_are_rejected_locally() {
    let (scheduler, events) = RecordingScheduler::new();
    let h = harness(scheduler, None);
    start_registered(&h, &events);
    offer(&h, &events, "O1");

    let elsewhere = h.driver.reply_to_offer(OfferID::new("O1"), vec![task("T1", "S9")], HashMap::new());
    match elsewhere {
        Err(DriverError::InvalidTask { task_id, .. }) => assert_eq!(task_id, TaskID::new("T1")),
        other => panic!("unexpected {:?}", other),
    }

    let duplicate = h.driver
        .reply_to_offer(OfferID::new("O1"), vec![task("T1", "S1"), task("T1", "S1")], HashMap::new());
    assert!(duplicate.is_err());

    assert!(h.transport.sent_named("ReplyToOffer").is_empty());
    h.driver.reply_to_offer(OfferID::new("O1"), vec![task("T1", "S1")], HashMap::new()).unwrap();
}

#[test]
fn commands_need_a_running_registered_driver() {
    let (scheduler, events) = RecordingScheduler::new();
    let h = harness(scheduler, None);

    assert_eq!(h.driver.kill_task(TaskID::new("T1")), Err(DriverError::NotRunning));
    assert_eq!(h.driver.join(), Err(DriverError::NotRunning));
    assert_eq!(h.driver.stop(), Err(DriverError::NotRunning));

    h.driver.start().unwrap();
    assert_eq!(h.driver.kill_task(TaskID::new("T1")), Err(DriverError::NotRegistered));
    assert_eq!(h.driver.revive_offers(), Err(DriverError::NotRegistered));
    assert!(h.transport.sent_named("KillTask").is_empty());

    h.transport.deliver(MASTER, Message::FrameworkRegistered { framework_id: FrameworkID::new("F1") });
    assert_eq!(events.next(), Event::Registered(FrameworkID::new("F1")));
    h.driver.kill_task(TaskID::new("T1")).unwrap();
    h.driver.send_hints(HashMap::new()).unwrap();
    assert_eq!(h.transport.sent_named("KillTask").len(), 1);
    assert_eq!(h.transport.sent_named("SendHints").len(), 1);

    h.driver.stop().unwrap();
    assert_eq!(h.driver.kill_task(TaskID::new("T1")), Err(DriverError::NotRunning));
}

#[test]
fn second_start_is_refused() {
    let (scheduler, events) = RecordingScheduler::new();
    let h = harness(scheduler, None);
    start_registered(&h, &events);

    assert_eq!(h.driver.start(), Err(DriverError::AlreadyStarted));
    assert_eq!(h.driver.state(), Ok(DriverState::Running));
    assert_eq!(h.transport.sent_named("RegisterFramework").len(), 1);
}

#[test]
fn stop_twice_unregisters_once() {
    let (scheduler, events) = RecordingScheduler::new();
    let h = harness(scheduler, None);
    start_registered(&h, &events);

    assert_eq!(h.driver.stop(), Ok(DriverState::Stopped));
    assert_eq!(h.driver.stop(), Err(DriverError::NotRunning));

    let unregister = h.transport.sent_named("UnregisterFramework");
    assert_eq!(unregister.len(), 1);
    assert_eq!(unregister[0].1,
               Message::UnregisterFramework { framework_id: FrameworkID::new("F1") });
    assert_eq!(h.driver.state(), Ok(DriverState::Stopped));
}

#[test]
fn all_joiners_are_released_with_the_same_status() {
    let (scheduler, events) = RecordingScheduler::new();
    let h = harness(scheduler, None);
    start_registered(&h, &events);

    let joiners: Vec<_> = (0..4)
        .map(|_| {
            let driver = h.driver.clone();
            thread::spawn(move || driver.join())
        })
        .collect();
    thread::sleep(Duration::from_millis(100));

    h.driver.stop().unwrap();
    for joiner in joiners {
        assert_eq!(joiner.join().unwrap(), Ok(DriverState::Stopped));
    }
}

#[test]
fn start_times_out_without_a_master_and_can_be_retried() {
    init_logging();
    let (scheduler, events) = RecordingScheduler::new();
    let transport = RecordingTransport::new();
    let detector = ManualDetector::new(None);
    let driver = MesosSchedulerDriver::with_collaborators(Box::new(scheduler),
                                                          params(),
                                                          None,
                                                          transport.clone(),
                                                          detector.clone())
        .unwrap();

    assert_eq!(driver.start(), Err(DriverError::MasterDetectTimeout(Duration::from_secs(1))));
    assert_eq!(driver.state(), Ok(DriverState::NotStarted));
    assert!(transport.sent().is_empty());

    detector.appoint(MASTER);
    assert_eq!(driver.start(), Ok(DriverState::Running));
    transport.wait_for("RegisterFramework", 1);
    transport.deliver(MASTER, Message::FrameworkRegistered { framework_id: FrameworkID::new("F7") });
    assert_eq!(events.next(), Event::Registered(FrameworkID::new("F7")));
    assert_eq!(driver.framework_id(), Ok(FrameworkID::new("F7")));
}

#[test]
fn master_failover_reregisters_with_the_same_identity() {
    let (scheduler, events) = RecordingScheduler::new();
    let h = harness(scheduler, None);
    start_registered(&h, &events);
    offer(&h, &events, "O1");

    h.detector.appoint(OTHER_MASTER);
    assert_eq!(events.next(), Event::Rescinded(OfferID::new("O1")));

    let reregister = h.transport.wait_for("ReregisterFramework", 1);
    assert_eq!(reregister[0].0, OTHER_MASTER);
    match reregister[0].1 {
        Message::ReregisterFramework { ref framework_id, failover, .. } => {
            assert_eq!(*framework_id, FrameworkID::new("F1"));
            assert!(!failover);
        }
        ref other => panic!("unexpected {:?}", other),
    }
    assert_eq!(h.driver.reply_to_offer(OfferID::new("O1"), vec![], HashMap::new()),
               Err(DriverError::NotRegistered));

    // Traffic from the old master is no longer trusted.
    h.transport.deliver(MASTER,
                        Message::ResourceOffer {
                            offer_id: OfferID::new("O2"),
                            offers: vec![slave_offer("S1")],
                        });
    h.transport.deliver(OTHER_MASTER, Message::FrameworkRegistered { framework_id: FrameworkID::new("F1") });
    assert_eq!(events.next(), Event::Registered(FrameworkID::new("F1")));

    h.transport.deliver(OTHER_MASTER,
                        Message::ResourceOffer {
                            offer_id: OfferID::new("O3"),
                            offers: vec![slave_offer("S1")],
                        });
    match events.next() {
        Event::Offer(offer_id, _) => assert_eq!(offer_id, OfferID::new("O3")),
        other => panic!("unexpected {:?}", other),
    }
    h.driver.reply_to_offer(OfferID::new("O3"), vec![], HashMap::new()).unwrap();
    assert_eq!(h.transport.sent_named("ReplyToOffer")[0].0, OTHER_MASTER);
}

#[test]
fn rejected_reregistration_aborts() {
    let (scheduler, events) = RecordingScheduler::new();
    let h = harness(scheduler, None);
    start_registered(&h, &events);

    h.detector.appoint(OTHER_MASTER);
    h.transport.wait_for("ReregisterFramework", 1);
    h.transport.deliver(OTHER_MASTER,
                        Message::Error {
                            code: error_code::FRAMEWORK_NOT_FOUND,
                            message: "unknown framework F1".to_string(),
                        });

    assert_eq!(events.next(),
               Event::Error(error_code::FRAMEWORK_NOT_FOUND, "unknown framework F1".to_string()));
    assert_eq!(h.driver.join(), Ok(DriverState::Aborted));
    assert!(h.transport.sent_named("RegisterFramework").len() == 1);
}

#[test]
fn master_error_aborts_and_reports_once() {
    let (scheduler, events) = RecordingScheduler::new();
    let h = harness(scheduler, None);
    start_registered(&h, &events);

    let joiner = {
        let driver = h.driver.clone();
        thread::spawn(move || driver.join())
    };

    h.transport.deliver(MASTER,
                        Message::Error {
                            code: error_code::REGISTRATION_REFUSED,
                            message: "refused".to_string(),
                        });
    h.transport.deliver(MASTER,
                        Message::Error {
                            code: error_code::REGISTRATION_REFUSED,
                            message: "refused again".to_string(),
                        });

    assert_eq!(events.next(), Event::Error(error_code::REGISTRATION_REFUSED, "refused".to_string()));
    events.assert_quiet();
    assert_eq!(joiner.join().unwrap(), Ok(DriverState::Aborted));
    assert_eq!(h.driver.stop(), Err(DriverError::NotRunning));
    assert_eq!(h.driver.revive_offers(), Err(DriverError::NotRunning));
}

#[test]
fn lost_link_aborts() {
    let (scheduler, events) = RecordingScheduler::new();
    let h = harness(scheduler, None);
    start_registered(&h, &events);

    h.transport.link_lost("connection refused");
    match events.next() {
        Event::Error(code, _) => assert_eq!(code, error_code::MASTER_UNREACHABLE),
        other => panic!("unexpected {:?}", other),
    }
    assert_eq!(h.driver.join(), Ok(DriverState::Aborted));
}

struct PanicOnStatus;

impl Scheduler for PanicOnStatus {
    fn status_update(&mut self, _driver: &dyn SchedulerDriver, status: &TaskStatus) {
        panic!("scheduler failed on update for {}", status.task_id);
    }
}

#[test]
fn panicking_callback_releases_joiners() {
    let h = harness_with(Box::new(PanicOnStatus), None);
    h.driver.start().unwrap();
    h.transport.wait_for("RegisterFramework", 1);
    h.transport.deliver(MASTER, Message::FrameworkRegistered { framework_id: FrameworkID::new("F1") });

    let (done, joined) = channel();
    let driver = h.driver.clone();
    thread::spawn(move || {
        let _ = done.send(driver.join());
    });

    let running = TaskStatus::new(TaskID::new("T1"), TaskState::Running);
    h.transport.deliver(MASTER, Message::StatusUpdate { status: running });

    assert_eq!(joined.recv_timeout(Duration::from_secs(5)).unwrap(), Err(DriverError::Poisoned));
    assert_eq!(h.driver.state(), Err(DriverError::Poisoned));
}

struct StopWhileNaming;

impl Scheduler for StopWhileNaming {
    fn framework_name(&mut self, driver: &dyn SchedulerDriver) -> String {
        let _ = driver.stop();
        "stopping".to_string()
    }
}

#[test]
fn stop_during_registration_callbacks_sends_nothing() {
    let h = harness_with(Box::new(StopWhileNaming), None);

    assert_eq!(h.driver.start(), Ok(DriverState::Stopped));
    assert_eq!(h.driver.state(), Ok(DriverState::Stopped));
    assert!(h.transport.sent().is_empty());
    assert_eq!(h.driver.join(), Ok(DriverState::Stopped));
    assert_eq!(h.driver.start(), Err(DriverError::AlreadyStarted));
}

#[test]
fn failover_rescinds_offers_in_arrival_order() {
    let (scheduler, events) = RecordingScheduler::new();
    let h = harness(scheduler, None);
    start_registered(&h, &events);
    offer(&h, &events, "O2");
    offer(&h, &events, "O10");
    offer(&h, &events, "O1");

    h.detector.appoint(OTHER_MASTER);
    assert_eq!(events.next(), Event::Rescinded(OfferID::new("O2")));
    assert_eq!(events.next(), Event::Rescinded(OfferID::new("O10")));
    assert_eq!(events.next(), Event::Rescinded(OfferID::new("O1")));
    h.transport.wait_for("ReregisterFramework", 1);
}

#[test]
fn losing_the_master_invalidates_offers_until_a_new_one_appears() {
    let (scheduler, events) = RecordingScheduler::new();
    let h = harness(scheduler, None);
    start_registered(&h, &events);
    offer(&h, &events, "O1");

    h.detector.lose();
    assert_eq!(events.next(), Event::Rescinded(OfferID::new("O1")));
    assert_eq!(h.driver.kill_task(TaskID::new("T1")), Err(DriverError::NotRegistered));

    h.detector.appoint(OTHER_MASTER);
    let reregister = h.transport.wait_for("ReregisterFramework", 1);
    assert_eq!(reregister[0].0, OTHER_MASTER);
    assert_eq!(h.driver.state(), Ok(DriverState::Running));
}

#[test]
fn existing_identity_fails_over_and_must_be_confirmed() {
    let (scheduler, events) = RecordingScheduler::new();
    let h = harness(scheduler, Some(FrameworkID::new("F1")));

    h.driver.start().unwrap();
    let reregister = h.transport.wait_for("ReregisterFramework", 1);
    match reregister[0].1 {
        Message::ReregisterFramework { ref framework_id, failover, .. } => {
            assert_eq!(*framework_id, FrameworkID::new("F1"));
            assert!(failover);
        }
        ref other => panic!("unexpected {:?}", other),
    }
    assert!(h.transport.sent_named("RegisterFramework").is_empty());

    h.transport.deliver(MASTER, Message::FrameworkRegistered { framework_id: FrameworkID::new("F2") });
    match events.next() {
        Event::Error(code, _) => assert_eq!(code, error_code::PROTOCOL_VIOLATION),
        other => panic!("unexpected {:?}", other),
    }
    assert_eq!(h.driver.join(), Ok(DriverState::Aborted));
}

#[test]
fn framework_messages_and_lost_slaves_reach_the_scheduler() {
    let (scheduler, events) = RecordingScheduler::new();
    let h = harness(scheduler, None);
    start_registered(&h, &events);

    let message = FrameworkMessage {
        slave_id: SlaveID::new("S1"),
        task_id: TaskID::new("T1"),
        data: b"hello".to_vec(),
    };
    h.transport.deliver(MASTER,
                        Message::FrameworkMessage {
                            framework_id: FrameworkID::new("F1"),
                            message: message.clone(),
                        });
    h.transport.deliver(MASTER, Message::LostSlave { slave_id: SlaveID::new("S1") });

    assert_eq!(events.next(), Event::Message(message));
    assert_eq!(events.next(), Event::SlaveLost(SlaveID::new("S1")));
}

#[test]
fn callbacks_get_a_scoped_driver_and_reentry_is_rejected() {
    let outer: Arc<Mutex<Option<Weak<MesosSchedulerDriver>>>> = Arc::new(Mutex::new(None));
    let (results, observed) = channel();

    let hook_outer = outer.clone();
    let hook: OfferHook = Box::new(move |driver: &dyn SchedulerDriver, offer_id: &OfferID, _offers: &[SlaveOffer]| {
        let outer_driver = hook_outer.lock().unwrap().as_ref().and_then(|weak| weak.upgrade());
        let outer_result = outer_driver.map(|outer| outer.revive_offers());
        let join_result = driver.join();
        let reply_result = driver.reply_to_offer(offer_id.clone(), vec![task("T1", "S1")], HashMap::new());
        results.send((outer_result, join_result, reply_result)).unwrap();
    });
    let (scheduler, events) = RecordingScheduler::with_offer_hook(hook);
    let h = harness(scheduler, None);
    *outer.lock().unwrap() = Some(Arc::downgrade(&h.driver));

    start_registered(&h, &events);
    offer(&h, &events, "O1");

    let (outer_result, join_result, reply_result) = observed.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(outer_result, Some(Err(DriverError::Reentrant)));
    assert_eq!(join_result, Err(DriverError::Reentrant));
    assert_eq!(reply_result, Ok(()));
    assert_eq!(h.transport.sent_named("ReplyToOffer").len(), 1);

    // Outside the callback the same driver works as usual.
    h.driver.revive_offers().unwrap();
}

#[test]
fn concurrent_commands_keep_per_caller_order() {
    let (scheduler, events) = RecordingScheduler::new();
    let h = harness(scheduler, None);
    start_registered(&h, &events);

    let callers: Vec<_> = (0..4)
        .map(|caller| {
            let driver = h.driver.clone();
            thread::spawn(move || {
                for n in 0..25 {
                    let message = FrameworkMessage {
                        slave_id: SlaveID::new("S1"),
                        task_id: TaskID::new(format!("caller-{}", caller)),
                        data: n.to_string().into_bytes(),
                    };
                    driver.send_framework_message(message).unwrap();
                }
            })
        })
        .collect();
    for caller in callers {
        caller.join().unwrap();
    }

    let sent = h.transport.sent_named("FrameworkMessage");
    assert_eq!(sent.len(), 100);
    for caller in 0..4 {
        let task_id = TaskID::new(format!("caller-{}", caller));
        let sequence: Vec<String> = sent.iter()
            .filter_map(|&(_, ref message)| match *message {
                Message::FrameworkMessage { ref message, .. } if message.task_id == task_id => {
                    Some(String::from_utf8(message.data.clone()).unwrap())
                }
                _ => None,
            })
            .collect();
        let expected: Vec<String> = (0..25).map(|n: i32| n.to_string()).collect();
        assert_eq!(sequence, expected);
    }
}

#[test]
fn snapshot_reflects_the_session() {
    let (scheduler, events) = RecordingScheduler::new();
    let h = harness(scheduler, None);
    start_registered(&h, &events);
    offer(&h, &events, "O1");

    // The dispatcher may still be leaving the callback's region.
    let snapshot = (0..100)
        .filter_map(|_| {
            let snapshot = h.driver.snapshot();
            if snapshot.is_none() {
                thread::sleep(Duration::from_millis(10));
            }
            snapshot
        })
        .next()
        .unwrap();
    assert_eq!(snapshot.state, DriverState::Running);
    assert_eq!(snapshot.framework_id, "F1");
    assert_eq!(snapshot.master, Some(MASTER.to_string()));
    assert_eq!(snapshot.outstanding_offers, vec!["O1".to_string()]);
    assert!(snapshot.registered);
    assert_eq!(snapshot.messages_sent, 1);
    assert_eq!(snapshot.events_delivered, 2);
}

fn local_params(slaves: &str) -> Params {
    let mut params = Params::from_url("local").unwrap();
    params.set("local_slaves", slaves);
    params.set("local_cpus", "2");
    params.set("local_mem", "1024");
    params.set("master_detect_timeout", "2");
    params
}

#[test]
fn task_runner_completes_against_a_local_cluster() {
    init_logging();
    assert_eq!(run_scheduler(local_params("2"), 5), Ok(DriverState::Stopped));
}

#[test]
fn local_cluster_failover_keeps_or_drops_the_framework() {
    init_logging();
    let params = local_params("1");
    let cluster = LocalCluster::new(&params).unwrap();
    let (scheduler, events) = RecordingScheduler::new();
    let driver = MesosSchedulerDriver::with_collaborators(Box::new(scheduler),
                                                          params,
                                                          None,
                                                          Arc::new(cluster.transport()),
                                                          Arc::new(cluster.detector()))
        .unwrap();

    driver.start().unwrap();
    let framework_id = match events.next() {
        Event::Registered(framework_id) => framework_id,
        other => panic!("unexpected {:?}", other),
    };
    let first_offer = match events.next() {
        Event::Offer(offer_id, _) => offer_id,
        other => panic!("unexpected {:?}", other),
    };

    cluster.fail_over(true);
    assert_eq!(events.next(), Event::Rescinded(first_offer));
    assert_eq!(events.next(), Event::Registered(framework_id.clone()));
    match events.next() {
        Event::Offer(..) => {}
        other => panic!("unexpected {:?}", other),
    }
    assert_eq!(cluster.framework_ids(), vec![framework_id]);

    cluster.fail_over(false);
    match events.next() {
        Event::Rescinded(_) => {}
        other => panic!("unexpected {:?}", other),
    }
    match events.next() {
        Event::Error(code, _) => assert_eq!(code, error_code::FRAMEWORK_NOT_FOUND),
        other => panic!("unexpected {:?}", other),
    }
    assert_eq!(driver.join(), Ok(DriverState::Aborted));
}

#[test]
fn plain_host_port_master_is_detected_statically() {
    init_logging();
    let (scheduler, events) = RecordingScheduler::new();
    let transport = RecordingTransport::new();
    let mut params = Params::from_url("10.0.0.1:5050").unwrap();
    params.set("master_detect_timeout", "1");
    let driver = MesosSchedulerDriver::with_transport(Box::new(scheduler), params, None, transport.clone()).unwrap();

    driver.start().unwrap();
    let register = transport.wait_for("RegisterFramework", 1);
    assert_eq!(register[0].0, MASTER);

    transport.deliver(MASTER, Message::FrameworkRegistered { framework_id: FrameworkID::new("F3") });
    assert_eq!(events.next(), Event::Registered(FrameworkID::new("F3")));
}

#[test]
fn urls_without_a_transport_are_refused() {
    let (scheduler, _events) = RecordingScheduler::new();
    match MesosSchedulerDriver::with_url(Box::new(scheduler), "zoo://zk1:2181/mesos", None) {
        Err(DriverError::Config(_)) => {}
        Err(other) => panic!("unexpected {:?}", other),
        Ok(_) => panic!("zoo:// must be refused"),
    }
}

#[test]
fn local_cluster_link_loss_aborts_the_driver() {
    init_logging();
    let params = local_params("1");
    let cluster = LocalCluster::new(&params).unwrap();
    let (scheduler, events) = RecordingScheduler::new();
    let driver = MesosSchedulerDriver::with_collaborators(Box::new(scheduler),
                                                          params,
                                                          None,
                                                          Arc::new(cluster.transport()),
                                                          Arc::new(cluster.detector()))
        .unwrap();

    driver.start().unwrap();
    match events.next() {
        Event::Registered(_) => {}
        other => panic!("unexpected {:?}", other),
    }
    match events.next() {
        Event::Offer(..) => {}
        other => panic!("unexpected {:?}", other),
    }

    cluster.lose_master();
    match events.next() {
        Event::Rescinded(_) => {}
        other => panic!("unexpected {:?}", other),
    }
    assert!(cluster.master().is_none());

    cluster.disconnect("network partition");
    assert_eq!(events.next(),
               Event::Error(error_code::MASTER_UNREACHABLE, "network partition".to_string()));
    assert_eq!(driver.join(), Ok(DriverState::Aborted));
}
