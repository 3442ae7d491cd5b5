//! Register protocol checks against the simulated window

use std::thread;
use std::time::Duration;

use bcm2835_gpio::bank::RegisterWrite;
use bcm2835_gpio::chip::regs;
use bcm2835_gpio::{Config, Direction, Level, Manager, Pull, RegisterBank, SimulatedWindow};

fn manager() -> Manager<SimulatedWindow> {
    let config = Config::default().with_settle(Duration::ZERO);
    Manager::with_bank(SimulatedWindow::new(), &config).unwrap()
}

#[test]
fn test_output_round_trip_every_pin() {
    let gpio = manager();
    for pin in gpio.pins() {
        pin.set_direction(Direction::Out);
        pin.set_value(Level::High);
        assert_eq!(pin.value(), Level::High, "GPIO {}", pin.number());
        pin.set_value(Level::Low);
        assert_eq!(pin.value(), Level::Low, "GPIO {}", pin.number());
    }
}

#[test]
fn test_input_pin_ignores_drive() {
    let gpio = manager();
    let pin = gpio.pin(27).unwrap();
    pin.set_direction(Direction::In);
    pin.set_value(Level::High);
    assert_eq!(pin.value(), Level::Low);
}

#[test]
fn test_direction_touches_only_own_field() {
    let gpio = manager();
    let fill = [0xA5A5_A5A5u32, 0x5A5A_5A5A, 0xFFFF_FFFF, 0];

    for pin in gpio.pins() {
        for &pattern in &fill {
            for direction in [Direction::In, Direction::Out] {
                for cell in 0..gpio.bank().len() {
                    gpio.bank().poke(cell, pattern);
                }
                let before = gpio.bank().snapshot();
                pin.set_direction(direction);
                let after = gpio.bank().snapshot();

                let n = pin.number() as usize;
                let field = 0b111u32 << ((n % 10) * 3);
                for (cell, (b, a)) in before.iter().zip(&after).enumerate() {
                    let mask = if cell == n / 10 { !field } else { u32::MAX };
                    assert_eq!((b ^ a) & mask, 0, "GPIO {} changed cell {}", n, cell);
                }
            }
        }
    }
}

#[test]
fn test_pull_protocol_states() {
    for (pull, value) in [(Pull::Up, 2), (Pull::Down, 1), (Pull::Off, 0)] {
        for number in [0u8, 17, 31, 32, 53] {
            let gpio = manager();
            gpio.pin(number).unwrap().set_pull(pull);

            let clock = regs::GPPUDCLK0 + number as usize / 32;
            let journal = gpio.bank().journal();
            assert_eq!(journal.len(), 4);
            assert_eq!(journal[0], RegisterWrite { index: regs::GPPUD, value });
            assert_eq!(
                journal[1],
                RegisterWrite { index: clock, value: 1 << (number % 32) }
            );
            assert_eq!(gpio.bank().peek(regs::GPPUD) & 0b11, 0);
            assert_eq!(gpio.bank().peek(clock), 0);
        }
    }
}

#[test]
fn test_pull_preserves_upper_gppud_bits() {
    let gpio = manager();
    gpio.bank().poke(regs::GPPUD, 0xF0);
    gpio.pin(4).unwrap().pull_up();

    assert_eq!(gpio.bank().journal()[0].value, 0xF2);
    assert_eq!(gpio.bank().peek(regs::GPPUD), 0xF0);
}

#[test]
fn test_set_value_banks_disjoint() {
    let gpio = manager();
    let set = regs::GPSET0..regs::GPSET0 + 2;
    let clear = regs::GPCLR0..regs::GPCLR0 + 2;

    for pin in gpio.pins() {
        gpio.bank().clear_journal();
        pin.set_value(Level::High);
        assert!(gpio.bank().journal().iter().all(|w| set.contains(&w.index)));

        gpio.bank().clear_journal();
        pin.set_value(Level::Low);
        assert!(gpio.bank().journal().iter().all(|w| clear.contains(&w.index)));
    }
}

#[test]
fn test_pin_17_scenario() {
    let gpio = manager();
    let pin = gpio.pin(17).unwrap();

    pin.set_direction(Direction::Out);
    gpio.bank().clear_journal();

    pin.set_value(Level::High);
    assert_eq!(
        gpio.bank().journal(),
        vec![RegisterWrite { index: regs::GPSET0, value: 1 << 17 }]
    );

    pin.stop_pulling();
    assert_eq!(gpio.bank().peek(37), 0);
    assert_eq!(gpio.bank().peek(38 + 17 / 32), 0);
}

#[test]
fn test_concurrent_direction_changes_share_cell() {
    let gpio = manager();

    thread::scope(|s| {
        for number in 0..10u8 {
            let pin = gpio.pin(number).unwrap();
            s.spawn(move || {
                for i in 0..200 {
                    let direction = if i % 2 == 0 { Direction::In } else { Direction::Out };
                    pin.set_direction(direction);
                }
            });
        }
    });

    // Every pin's last write was Out
    assert_eq!(gpio.bank().peek(regs::GPFSEL0), 0x0924_9249);
}

#[test]
fn test_concurrent_pulls_do_not_interleave() {
    let gpio = manager();

    thread::scope(|s| {
        for number in [2u8, 3, 40, 41] {
            let pin = gpio.pin(number).unwrap();
            s.spawn(move || {
                for _ in 0..20 {
                    pin.pull_up();
                }
            });
        }
    });

    let journal = gpio.bank().journal();
    assert_eq!(journal.len(), 4 * 4 * 20);
    for seq in journal.chunks(4) {
        assert_eq!(seq[0], RegisterWrite { index: regs::GPPUD, value: 2 });
        assert!(seq[1].index == regs::GPPUDCLK0 || seq[1].index == regs::GPPUDCLK0 + 1);
        assert_eq!(seq[2], RegisterWrite { index: regs::GPPUD, value: 0 });
        assert_eq!(seq[3], RegisterWrite { index: seq[1].index, value: 0 });
    }
}
