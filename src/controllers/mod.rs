pub mod siswa_controller;
